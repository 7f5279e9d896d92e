//! Error responses for the HTTP endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use recon_core::ReconError;
use recon_scanner::ScanError;
use serde::Serialize;
use std::fmt;
use tracing::error;

/// Error returned by a handler, rendered as `{"error", "code"}`.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status of the response
    pub status: StatusCode,
    /// Error code for client handling (e.g., "VALIDATION_ERROR")
    pub code: &'static str,
    /// User-facing message
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Rejected input (400).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Unexpected failure (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: &self.message,
            code: self.code,
        });
        (self.status, body).into_response()
    }
}

impl From<ReconError> for ApiError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Validation(msg) => Self::validation(msg),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        error!("Scan failed: {}", err);
        Self::internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}
