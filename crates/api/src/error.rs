//! HTTP error mapping.
//!
//! [`AppError`] carries every failure a handler can produce and renders
//! the project-wide `{ "error", "code" }` JSON body. Each [`StageError`]
//! variant keeps its own `code` so voter clients can branch on the code
//! alone (terminal policy errors vs. retryable transport ones).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use stage_core::error::StageError;

/// Handler-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain error from the stage engine.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request DTO failed `validator` checks.
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Missing resource, with a human-readable message.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request, with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal failure; the message is logged, never sent to the client.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Stage(stage) => stage_response(stage),
            AppError::Database(err) => database_response(err),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto its HTTP status and stable error code.
///
/// Policy rejections (`ALREADY_VOTED`, `CHANGE_LIMIT_EXCEEDED`) and
/// out-of-phase submissions are 409s: the request was well-formed but
/// conflicts with session state, and retrying it will not help.
fn stage_response(err: &StageError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        StageError::AlreadyVoted => (StatusCode::CONFLICT, "ALREADY_VOTED"),
        StageError::ChangeLimitExceeded { .. } => (StatusCode::CONFLICT, "CHANGE_LIMIT_EXCEEDED"),
        StageError::InvalidPhaseTransition { .. } => (StatusCode::CONFLICT, "INVALID_PHASE"),
        StageError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        StageError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StageError::SyncUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SYNC_UNAVAILABLE"),
    };
    (status, code, err.to_string())
}

/// Map a sqlx error, keeping raw database detail out of client bodies.
///
/// Unique violations on our `uq_`-prefixed constraints surface as 409
/// (a concurrent writer beat this request to the natural key); anything
/// else is logged and sanitized to a 500.
fn database_response(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        // 23505 is Postgres for unique_violation.
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
