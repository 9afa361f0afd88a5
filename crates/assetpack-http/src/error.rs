//! # Serving Errors
//!
//! `ServeError` implements `axum::response::IntoResponse`. Unresolvable
//! paths are an ordinary 404. Failures while deriving a resource's bytes
//! indicate a corrupt bundle; they answer 500, are logged at `error`, and
//! their details never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, e.g. `NOT_FOUND`.
    pub code: String,
    pub message: String,
}

/// Error from the delivery handler.
#[derive(Error, Debug)]
pub enum ServeError {
    /// No resource at the requested path (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource could not produce its bytes (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "failed to serve resource");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<assetpack_bundle::ResourceError> for ServeError {
    fn from(err: assetpack_bundle::ResourceError) -> Self {
        Self::Internal(err.to_string())
    }
}
