//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": ["title must not be empty", "limit must be positive"]
///   }
/// }
/// ```
///
/// `message` is an array for validation failures (one entry per problem)
/// and a plain string otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ApiError`]).
    pub code: u32,
    /// Human-readable message, or the list of validation messages.
    pub message: ErrorMessage,
}

/// Either a single message or a list of validation messages.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// A single human-readable message.
    Single(String),
    /// One message per failed validation rule.
    Many(Vec<String>),
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                 |
/// |-----------|-------------------|-----------------------------|
/// | 1000–1099 | Validation        | 400 Bad Request / 413       |
/// | 1100–1199 | Auth              | 401 Unauthorized / 403      |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more request fields failed validation.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Malformed request (unparseable body, query string or multipart form).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Missing, malformed, or expired credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated caller lacks the role or ownership required.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested record does not exist (or is not visible to the caller).
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. `"offer"`.
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Uniqueness or state conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Media storage (filesystem) failure.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for a [`ApiError::NotFound`] with any displayable id.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Shorthand for a single-message [`ApiError::Validation`].
    #[must_use]
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::PayloadTooLarge(_) => 1003,
            Self::Unauthorized(_) => 1101,
            Self::Forbidden(_) => 1102,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::PersistenceError(_) => 3001,
            Self::StorageError(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::StorageError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            let what = db.constraint().unwrap_or("unique constraint");
            return Self::Conflict(format!("duplicate value violates {what}"));
        }
        Self::PersistenceError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let code = self.error_code();
        let message = match self {
            Self::Validation(messages) => ErrorMessage::Many(messages),
            other => ErrorMessage::Single(other.to_string()),
        };
        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
