// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::store::KvError;

/// Missing or malformed submission input. Raised before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// A key-value operation failed while saving or reading submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record itself could not be written. Nothing was persisted.
    RecordWrite(KvError),

    /// The record was written but the recent index was not updated.
    /// The record exists under `saved_id` yet cannot be found via the index.
    IndexWrite { saved_id: String, source: KvError },

    /// A read (index load or record lookup) failed.
    Read(KvError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::RecordWrite(e) => write!(f, "record write failed: {}", e),
            StoreError::IndexWrite { saved_id, source } => write!(
                f,
                "record '{}' saved but recent index not updated: {}",
                saved_id, source
            ),
            StoreError::Read(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Failure of a submission store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    Validation(ValidationError),
    Store(StoreError),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::Validation(e) => write!(f, "validation failed: {}", e),
            SubmissionError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        SubmissionError::Validation(err)
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        SubmissionError::Store(err)
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 500, but the submission record did land in the store
    PartiallyPersisted { saved_id: String, message: String },

    // 503 Service Unavailable (store unreachable on health probe)
    ServiceUnavailable(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "Internal Server Error" }),
                )
            }
            AppError::PartiallyPersisted { saved_id, message } => {
                tracing::error!("Partial write for {}: {}", saved_id, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "error": "Answers saved but the recent list was not updated",
                        "savedId": saved_id,
                        "indexUpdated": false,
                    }),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "success": false, "error": "Store unavailable" }),
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "success": false, "error": msg }))
            }
            AppError::AuthError(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "success": false, "error": msg }))
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, json!({ "success": false, "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(e) => AppError::BadRequest(e.0),
            SubmissionError::Store(StoreError::IndexWrite { saved_id, source }) => {
                AppError::PartiallyPersisted {
                    saved_id,
                    message: source.to_string(),
                }
            }
            SubmissionError::Store(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<KvError> for AppError {
    fn from(err: KvError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
