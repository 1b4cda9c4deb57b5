//! Error types for Shelfmark server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Borrowing limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    #[error("Invalid loan state: {0}")]
    InvalidLoanState(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Set when the caller may safely retry the same request
    pub retryable: bool,
}

/// Store contention and timeouts roll back cleanly, so the caller may retry.
fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => {
            // 40001 = serialization_failure, 40P01 = deadlock_detected
            matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, retryable) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "Authentication", msg.clone(), false)
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, "Authorization", msg.clone(), false)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg.clone(), false),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "Validation", msg.clone(), false)
            }
            AppError::Database(e) if is_transient(e) => {
                tracing::warn!("Transient store error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TransientStoreError",
                    "Store contention, please retry".to_string(),
                    true,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database",
                    "Database error".to_string(),
                    false,
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg.clone(), false),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BadRequest", msg.clone(), false)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal",
                    "Internal server error".to_string(),
                    false,
                )
            }
            AppError::LimitExceeded(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "LimitExceeded",
                msg.clone(),
                false,
            ),
            AppError::BookUnavailable(msg) => {
                (StatusCode::CONFLICT, "BookUnavailable", msg.clone(), false)
            }
            AppError::InvalidLoanState(msg) => {
                (StatusCode::CONFLICT, "InvalidLoanState", msg.clone(), false)
            }
        };

        let body = Json(ErrorResponse {
            error: kind.to_string(),
            message,
            retryable,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
