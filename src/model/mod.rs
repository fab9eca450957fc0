//! Pre-trained fraud classifiers
//!
//! The scoring pipeline only ever talks to the [`Classifier`] trait. The
//! concrete implementation is a JSON artifact loaded from disk at startup;
//! candidate paths are probed in order and the first readable artifact wins.

pub mod artifact;

pub use artifact::{ModelArtifact, TreeNode};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array2;
use tracing::{info, warn};

use crate::error::{FraudShieldError, Result};

/// Binary fraud classifier consumed by the scoring engine.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Predict a 0/1 fraud label for every row of the feature matrix.
    fn classify(&self, features: &Array2<f64>) -> Result<Vec<u8>>;

    /// Per-row fraud probabilities, when the model can produce them.
    fn score(&self, features: &Array2<f64>) -> Result<Option<Vec<f64>>>;

    /// Identifier shown in reports and API responses.
    fn name(&self) -> &str;
}

/// Where to look for model artifacts.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Candidate artifact paths, probed in order
    pub search_paths: Vec<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let search_paths = std::env::var("FRAUD_SHIELD_MODELS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect::<Vec<_>>()
            })
            .filter(|paths| !paths.is_empty())
            .unwrap_or_else(default_search_paths);
        Self { search_paths }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to replace the candidate list
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("models/random_forest_fraud.json"),
        PathBuf::from("models/logistic_regression_fraud.json"),
        PathBuf::from("creditcard.json"),
    ]
}

/// An artifact bound to the name it was loaded under.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    name: String,
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Read, parse and structurally validate an artifact file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        artifact.validate()?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        Ok(Self { name, artifact })
    }

    /// Wrap an in-memory artifact under a given name.
    pub fn from_artifact(name: impl Into<String>, artifact: ModelArtifact) -> Self {
        Self {
            name: name.into(),
            artifact,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl Classifier for LoadedModel {
    fn classify(&self, features: &Array2<f64>) -> Result<Vec<u8>> {
        self.artifact.classify(features)
    }

    fn score(&self, features: &Array2<f64>) -> Result<Option<Vec<f64>>> {
        let proba = self.artifact.probabilities(features)?;
        Ok(Some(proba.column(1).to_vec()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Probe the configured paths and return the first usable classifier.
///
/// Unreadable or invalid candidates are logged and skipped; only when every
/// candidate fails does this return [`FraudShieldError::ModelUnavailable`].
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>> {
    for path in &config.search_paths {
        if !path.exists() {
            continue;
        }
        match LoadedModel::from_path(path) {
            Ok(model) => {
                info!(
                    "✅ Loaded fraud model '{}' ({}) from {}",
                    model.name(),
                    model.artifact().kind(),
                    path.display()
                );
                return Ok(Arc::new(model));
            }
            Err(e) => warn!("Skipping model candidate {}: {}", path.display(), e),
        }
    }
    Err(FraudShieldError::ModelUnavailable)
}

/// Load outcome for a single candidate path.
#[derive(Debug, Clone)]
pub enum CandidateState {
    Loaded { kind: &'static str },
    Missing,
    Invalid { reason: String },
}

/// One row of the `models` listing.
#[derive(Debug, Clone)]
pub struct ModelCandidate {
    pub path: PathBuf,
    pub state: CandidateState,
}

/// Inspect every candidate path without short-circuiting.
pub fn probe_candidates(config: &ModelConfig) -> Vec<ModelCandidate> {
    config
        .search_paths
        .iter()
        .map(|path| {
            let state = if !path.exists() {
                CandidateState::Missing
            } else {
                match LoadedModel::from_path(path) {
                    Ok(model) => CandidateState::Loaded {
                        kind: model.artifact().kind(),
                    },
                    Err(e) => CandidateState::Invalid {
                        reason: e.to_string(),
                    },
                }
            };
            ModelCandidate {
                path: path.clone(),
                state,
            }
        })
        .collect()
}
