//! Structural validation of uploaded transaction tables
//!
//! Ported behavior: an upload is accepted when it has enough columns, keeps
//! enough of the canonical `V1`..`V28` feature set, and is mostly numeric.
//! The checks run in order and the first failure wins.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema;

use super::is_numeric_dtype;

/// How many missing feature names to show in the error message.
const MISSING_SAMPLE_LEN: usize = 5;

/// Tunable validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum number of columns in the upload
    pub min_columns: usize,
    /// Maximum number of canonical features that may be absent
    pub max_missing_features: usize,
    /// Minimum fraction of columns that must be numeric-typed
    pub min_numeric_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_columns: 5,
            max_missing_features: std::env::var("FRAUD_SHIELD_MAX_MISSING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            min_numeric_ratio: 0.8,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the minimum column count
    pub fn with_min_columns(mut self, n: usize) -> Self {
        self.min_columns = n;
        self
    }

    /// Builder method to set the missing-feature tolerance
    pub fn with_max_missing_features(mut self, n: usize) -> Self {
        self.max_missing_features = n;
        self
    }

    /// Builder method to set the numeric-column ratio
    pub fn with_min_numeric_ratio(mut self, ratio: f64) -> Self {
        self.min_numeric_ratio = ratio;
        self
    }
}

/// Why an upload was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("CSV must contain at least {required} columns")]
    TooFewColumns { found: usize, required: usize },

    #[error("Missing many expected feature columns: {}", missing_sample(.missing))]
    MissingFeatures { missing: Vec<String> },

    #[error("Most columns should be numeric")]
    TooFewNumeric { numeric: usize, total: usize },
}

fn missing_sample(missing: &[String]) -> String {
    let shown: Vec<&str> = missing
        .iter()
        .take(MISSING_SAMPLE_LEN)
        .map(String::as_str)
        .collect();
    if missing.len() > MISSING_SAMPLE_LEN {
        format!("{}, ...", shown.join(", "))
    } else {
        shown.join(", ")
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub columns: usize,
    /// Canonical features found in the upload
    pub matched_features: usize,
    /// Fraction of columns with a numeric dtype
    pub numeric_ratio: f64,
    pub message: String,
}

/// Schema validator for uploaded transaction tables.
///
/// Stateless apart from its configuration; the same table always yields the
/// same verdict.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
    expected: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            expected: schema::canonical_features(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check an upload against the expected schema.
    pub fn validate(&self, df: &DataFrame) -> Result<ValidationReport, ValidationError> {
        let total = df.width();
        if total < self.config.min_columns {
            return Err(ValidationError::TooFewColumns {
                found: total,
                required: self.config.min_columns,
            });
        }

        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        let missing: Vec<String> = self
            .expected
            .iter()
            .filter(|feature| !names.contains(&feature.as_str()))
            .cloned()
            .collect();
        if missing.len() > self.config.max_missing_features {
            return Err(ValidationError::MissingFeatures { missing });
        }

        let numeric = df.dtypes().iter().filter(|d| is_numeric_dtype(d)).count();
        if (numeric as f64) < total as f64 * self.config.min_numeric_ratio {
            return Err(ValidationError::TooFewNumeric { numeric, total });
        }

        Ok(ValidationReport {
            rows: df.height(),
            columns: total,
            matched_features: self.expected.len() - missing.len(),
            numeric_ratio: numeric as f64 / total as f64,
            message: "Data validation passed".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame with features V1..=Vn, three rows each.
    fn frame_with_features(n: usize) -> DataFrame {
        let cols: Vec<Column> = (1..=n)
            .map(|i| Series::new(format!("V{i}").into(), &[0.1f64, -0.2, 0.3]).into())
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn test_full_schema_passes() {
        let df = frame_with_features(28);
        let report = Validator::default().validate(&df).unwrap();
        assert_eq!(report.matched_features, 28);
        assert_eq!(report.columns, 28);
        assert_eq!(report.message, "Data validation passed");
        assert!((report.numeric_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_too_few_columns() {
        let df = frame_with_features(4);
        let err = Validator::default().validate(&df).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooFewColumns {
                found: 4,
                required: 5
            }
        );
        assert_eq!(err.to_string(), "CSV must contain at least 5 columns");
    }

    #[test]
    fn test_missing_features_over_limit() {
        // 7 canonical features present, 21 missing: one past the default limit
        let df = frame_with_features(7);
        let err = Validator::default().validate(&df).unwrap_err();
        match &err {
            ValidationError::MissingFeatures { missing } => assert_eq!(missing.len(), 21),
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.starts_with("Missing many expected feature columns: V8, V9"));
        assert!(msg.ends_with(", ..."));
    }

    #[test]
    fn test_missing_features_at_limit_passes() {
        // 8 present, exactly 20 missing: the limit itself is tolerated
        let df = frame_with_features(8);
        let report = Validator::default().validate(&df).unwrap();
        assert_eq!(report.matched_features, 8);
    }

    #[test]
    fn test_nine_of_twentyeight_passes() {
        let df = frame_with_features(9);
        assert!(Validator::default().validate(&df).is_ok());
    }

    #[test]
    fn test_mostly_text_columns_fail() {
        let mut cols: Vec<Column> = (1..=9)
            .map(|i| Series::new(format!("V{i}").into(), &[0.1f64, 0.2, 0.3]).into())
            .collect();
        for i in 0..4 {
            cols.push(Series::new(format!("note{i}").into(), &["a", "b", "c"]).into());
        }
        let df = DataFrame::new(cols).unwrap();
        // 9 of 13 numeric = 69%
        let err = Validator::default().validate(&df).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooFewNumeric {
                numeric: 9,
                total: 13
            }
        );
        assert_eq!(err.to_string(), "Most columns should be numeric");
    }

    #[test]
    fn test_numeric_ratio_boundary_passes() {
        // 8 numeric of 10 columns is exactly 80%
        let mut cols: Vec<Column> = (1..=8)
            .map(|i| Series::new(format!("V{i}").into(), &[0.1f64, 0.2, 0.3]).into())
            .collect();
        cols.push(Series::new("merchant".into(), &["a", "b", "c"]).into());
        cols.push(Series::new("country".into(), &["x", "y", "z"]).into());
        let df = DataFrame::new(cols).unwrap();
        let report = Validator::default().validate(&df).unwrap();
        assert!((report.numeric_ratio - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_integer_columns_count_as_numeric() {
        let mut cols: Vec<Column> = (1..=9)
            .map(|i| Series::new(format!("V{i}").into(), &[0.1f64, 0.2, 0.3]).into())
            .collect();
        cols.push(Series::new("Amount".into(), &[10i64, 25, 400]).into());
        let df = DataFrame::new(cols).unwrap();
        assert!(Validator::default().validate(&df).is_ok());
    }

    #[test]
    fn test_configurable_missing_limit() {
        let config = ValidationConfig::new().with_max_missing_features(2);
        let df = frame_with_features(25); // 3 missing
        let err = Validator::new(config).validate(&df).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFeatures { .. }));
    }

    #[test]
    fn test_zero_row_table_still_validates() {
        let cols: Vec<Column> = (1..=28)
            .map(|i| Series::new(format!("V{i}").into(), Vec::<f64>::new()).into())
            .collect();
        let df = DataFrame::new(cols).unwrap();
        let report = Validator::default().validate(&df).unwrap();
        assert_eq!(report.rows, 0);
    }
}
