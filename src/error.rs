//! Error types for the exam engine.
//!
//! One service-wide error enum; the `IntoResponse` impl maps each kind onto
//! the HTTP response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Service error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Row lookup or authorization failure (404).
    #[error("{0}")]
    NotFoundOrForbidden(String),

    /// Malformed input (400).
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Database or transaction failure (500).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unexpected state; the affected row is left as-is (500).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::InvariantViolation(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience Result type using the service error.
pub type Result<T> = std::result::Result<T, Error>;
