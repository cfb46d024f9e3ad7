// Request-level error type for the scan API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::utils::url_normalizer::ValidationError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ScanError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ScanError::Internal(detail) => {
                error!("Scan failed with internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            },
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<ValidationError> for ScanError {
    fn from(error: ValidationError) -> Self {
        ScanError::InvalidInput(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ScanError {
    fn from(error: validator::ValidationErrors) -> Self {
        ScanError::InvalidInput(error.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for ScanError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ScanError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}
