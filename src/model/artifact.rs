//! Serialized classifier artifacts
//!
//! Artifacts are JSON documents tagged with a `model_type` field. Two kinds
//! are supported: a logistic regression (coefficient vector plus intercept)
//! and a random forest (flattened decision trees). Both produce hard 0/1
//! labels and a two-column probability matrix `[P(legitimate), P(fraud)]`.

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FraudShieldError, Result};

/// Row count above which scoring fans out across threads.
const PARALLEL_ROW_THRESHOLD: usize = 4096;

fn default_threshold() -> f64 {
    0.5
}

/// A pre-trained model as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression {
        /// One weight per feature column
        coefficients: Vec<f64>,
        intercept: f64,
        /// Decision threshold on the fraud probability
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    RandomForest {
        trees: Vec<TreeNode>,
        /// Number of feature columns the trees were trained on
        n_features: usize,
    },
}

/// Node in a serialized decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Predicted class (0.0 or 1.0)
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walk the tree for a single sample.
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    /// Largest feature index referenced anywhere in the tree.
    fn max_feature_index(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                let mut max = *feature;
                if let Some(l) = left.max_feature_index() {
                    max = max.max(l);
                }
                if let Some(r) = right.max_feature_index() {
                    max = max.max(r);
                }
                Some(max)
            }
        }
    }
}

impl ModelArtifact {
    /// Short identifier matching the JSON `model_type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression { .. } => "logistic_regression",
            ModelArtifact::RandomForest { .. } => "random_forest",
        }
    }

    /// Number of feature columns the artifact expects.
    pub fn n_features(&self) -> usize {
        match self {
            ModelArtifact::LogisticRegression { coefficients, .. } => coefficients.len(),
            ModelArtifact::RandomForest { n_features, .. } => *n_features,
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::LogisticRegression { coefficients, .. } => {
                if coefficients.is_empty() {
                    return Err(FraudShieldError::Artifact(
                        "logistic regression has no coefficients".to_string(),
                    ));
                }
            }
            ModelArtifact::RandomForest { trees, n_features } => {
                if trees.is_empty() {
                    return Err(FraudShieldError::Artifact(
                        "random forest has no trees".to_string(),
                    ));
                }
                if *n_features == 0 {
                    return Err(FraudShieldError::Artifact(
                        "random forest declares zero features".to_string(),
                    ));
                }
                for (i, tree) in trees.iter().enumerate() {
                    if let Some(max) = tree.max_feature_index() {
                        if max >= *n_features {
                            return Err(FraudShieldError::Artifact(format!(
                                "tree {i} references feature {max} but only {n_features} exist"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Hard 0/1 labels for every row.
    pub fn classify(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        self.check_shape(x)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        let labels = match self {
            ModelArtifact::LogisticRegression { threshold, .. } => self
                .fraud_scores(x)
                .into_iter()
                .map(|p| u8::from(p >= *threshold))
                .collect(),
            ModelArtifact::RandomForest { .. } => self
                .fraud_scores(x)
                .into_iter()
                .map(|p| u8::from(p > 0.5))
                .collect(),
        };
        Ok(labels)
    }

    /// Two-column probability matrix `[P(legitimate), P(fraud)]`.
    pub fn probabilities(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_shape(x)?;
        let scores = self.fraud_scores(x);
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, p) in scores.into_iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    /// Per-row fraud probability: sigmoid score for the logistic model,
    /// fraction of fraud votes for the forest.
    fn fraud_scores(&self, x: &Array2<f64>) -> Vec<f64> {
        match self {
            ModelArtifact::LogisticRegression {
                coefficients,
                intercept,
                ..
            } => {
                let score_row = |row: ArrayView1<'_, f64>| {
                    let z: f64 = row
                        .iter()
                        .zip(coefficients.iter())
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
                        + intercept;
                    1.0 / (1.0 + (-z).exp())
                };
                if x.nrows() >= PARALLEL_ROW_THRESHOLD {
                    (0..x.nrows())
                        .into_par_iter()
                        .map(|i| score_row(x.row(i)))
                        .collect()
                } else {
                    (0..x.nrows()).map(|i| score_row(x.row(i))).collect()
                }
            }
            ModelArtifact::RandomForest { trees, .. } => {
                // One label vector per tree, then per-row vote fractions
                let all_predictions: Vec<Vec<f64>> = trees
                    .par_iter()
                    .map(|tree| (0..x.nrows()).map(|i| tree.predict(x.row(i))).collect())
                    .collect();
                (0..x.nrows())
                    .map(|i| {
                        let fraud_votes = all_predictions
                            .iter()
                            .filter(|preds| preds[i].round() as i64 == 1)
                            .count();
                        fraud_votes as f64 / trees.len() as f64
                    })
                    .collect()
            }
        }
    }

    fn check_shape(&self, x: &Array2<f64>) -> Result<()> {
        let expected = self.n_features();
        if x.ncols() != expected {
            return Err(FraudShieldError::Prediction(format!(
                "feature count mismatch: model expects {expected} columns, got {}",
                x.ncols()
            )));
        }
        Ok(())
    }
}
