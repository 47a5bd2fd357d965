//! HTTP error responses
//!
//! Every error leaves the service as `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown when classification or persistence fails mid-request
pub const PROCESSING_FAILED_MESSAGE: &str = "processing failed, please retry";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Classifier, upload storage or database failed during identification (503)
    #[error("{}", PROCESSING_FAILED_MESSAGE)]
    ProcessingFailed,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<wbid_common::Error> for ApiError {
    fn from(err: wbid_common::Error) -> Self {
        match err {
            wbid_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ProcessingFailed => (StatusCode::SERVICE_UNAVAILABLE, "PROCESSING_FAILED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
