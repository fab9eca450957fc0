//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::FraudShieldError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] FraudShieldError),
}

impl ServerError {
    /// HTTP status and user-facing message for this error.
    ///
    /// Internal details (IO failures, artifact defects) are logged here and
    /// replaced with generic text; everything else is safe to surface.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Pipeline(err) => match err {
                FraudShieldError::MissingUpload
                | FraudShieldError::InvalidCsv(_)
                | FraudShieldError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                FraudShieldError::ModelUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
                }
                FraudShieldError::Prediction(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                FraudShieldError::ExpiredToken => (StatusCode::GONE, err.to_string()),
                FraudShieldError::Artifact(detail) => {
                    tracing::error!(detail = %detail, "Model artifact error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model configuration error. Check server logs for details.".to_string(),
                    )
                }
                FraudShieldError::Io(e) => {
                    tracing::error!(detail = %e, "IO error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A file system error occurred".to_string(),
                    )
                }
                FraudShieldError::Polars(e) => {
                    let msg = e.to_string();
                    // Only expose safe parts of Polars errors
                    let safe_msg = if msg.contains("not found") || msg.contains("column") {
                        msg
                    } else {
                        "Data processing error. Check your data format.".to_string()
                    };
                    (StatusCode::BAD_REQUEST, safe_msg)
                }
                FraudShieldError::Json(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid JSON format".to_string())
                }
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
