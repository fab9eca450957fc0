//! Error types for the fraud analysis pipeline

use thiserror::Error;

use crate::preprocessing::ValidationError;

/// Crate-wide error type. Every failure the pipeline can produce is recovered
/// at the request boundary and surfaced as a user-visible message.
#[derive(Error, Debug)]
pub enum FraudShieldError {
    /// The request carried no usable file part
    #[error("No file part in request")]
    MissingUpload,

    /// The upload could not be parsed as CSV
    #[error("Failed to read CSV: {0}")]
    InvalidCsv(String),

    /// The parsed table does not match the expected schema
    #[error("Data validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No usable model artifact was found at any configured path
    #[error("Model not available. Please add a trained model file.")]
    ModelUnavailable,

    /// The model call itself failed (shape mismatch, defective artifact)
    #[error("Model prediction failed: {0}")]
    Prediction(String),

    /// A model file exists but fails structural checks
    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    /// Download requested after consumption or for an unknown token
    #[error("Your download link has expired. Please re-run the analysis.")]
    ExpiredToken,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FraudShieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FraudShieldError::InvalidCsv("unexpected end of file".to_string());
        assert_eq!(err.to_string(), "Failed to read CSV: unexpected end of file");

        let err = FraudShieldError::ModelUnavailable;
        assert!(err.to_string().contains("Model not available"));

        let err = FraudShieldError::ExpiredToken;
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FraudShieldError = io_err.into();
        assert!(matches!(err, FraudShieldError::Io(_)));
    }

    #[test]
    fn test_error_from_validation() {
        let err: FraudShieldError =
            ValidationError::TooFewColumns { found: 3, required: 5 }.into();
        assert!(matches!(err, FraudShieldError::Validation(_)));
        assert!(err.to_string().starts_with("Data validation failed:"));
    }
}
