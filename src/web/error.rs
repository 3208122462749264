//! API error handling for the depot web boundary.
//!
//! The core returns typed errors only; mapping them to HTTP statuses and
//! the `{"app_exception": ..., "context": ...}` body happens here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::DepotError;

/// Error kinds surfaced in the `app_exception` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Upload quota exhausted (400).
    QuotaExceeded,
    /// Upload exceeded the size ceiling (413).
    SizeExceeded,
    /// Download byte budget exhausted (429).
    RateLimited,
    /// Resource not found (404).
    NotFound,
    /// I/O failure while handling the file (400).
    IoError,
    /// Persistence failure (400).
    PersistenceError,
    /// Malformed request (400).
    BadRequest,
}

impl ErrorKind {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::QuotaExceeded => StatusCode::BAD_REQUEST,
            ErrorKind::SizeExceeded => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::IoError => StatusCode::BAD_REQUEST,
            ErrorKind::PersistenceError => StatusCode::BAD_REQUEST,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error kind name.
    pub app_exception: ErrorKind,
    /// Free-form error context.
    pub context: Value,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    context: Value,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(kind: ErrorKind, context: Value) -> Self {
        Self { kind, context }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, json!({ "error": message.into() }))
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        let body = ErrorBody {
            app_exception: self.kind,
            context: self.context,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for ApiError {}

impl From<DepotError> for ApiError {
    fn from(err: DepotError) -> Self {
        match &err {
            DepotError::QuotaExceeded { .. } => {
                ApiError::new(ErrorKind::QuotaExceeded, json!({ "error": err.to_string() }))
            }
            DepotError::SizeExceeded { .. } => {
                ApiError::new(ErrorKind::SizeExceeded, json!({ "error": err.to_string() }))
            }
            DepotError::RateLimited => {
                ApiError::new(ErrorKind::RateLimited, json!({ "error": err.to_string() }))
            }
            DepotError::NotFound(_) => {
                ApiError::new(ErrorKind::NotFound, json!({ "error": err.to_string() }))
            }
            DepotError::Io(_) => {
                tracing::error!("I/O error: {}", err);
                ApiError::new(
                    ErrorKind::IoError,
                    json!({ "error": "Error handling the file" }),
                )
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::new(
                    ErrorKind::PersistenceError,
                    json!({ "error": "Error processing the request" }),
                )
            }
        }
    }
}
