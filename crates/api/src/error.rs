use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lobby_core::error::CoreError;
use serde_json::json;

/// Everything a lobby handler can fail with.
///
/// Repository outcomes that the client can act on (already in a party,
/// invitation expired, party full) are turned into [`CoreError`] values by
/// the handlers. Raw store failures arrive as [`AppError::Database`].
/// Every variant renders as `{"error": <message>, "code": <CODE>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or blank request fields, with the message listing them.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full; the client only sees a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Lobby handler failed");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// `Gone` is used for invitations that expired or were already answered and
/// for parties disbanded under a pending invitation, so clients can tell
/// "try again later" (409) apart from "this will never succeed" (410).
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Gone(msg) => (StatusCode::GONE, "GONE", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Lobby invariant violated");
            internal()
        }
    }
}

/// Map a store error that no repository turned into an outcome.
///
/// The party repositories report the unique indexes they expect as outcomes:
/// `uq_party_members_user_id` becomes `AlreadyInParty` on create and accept,
/// and `uq_party_invitations_pending` becomes `AlreadyInvited`. The violation
/// that still lands here is a party create whose conflicting membership was
/// already gone when the repository looked it up again, because the other
/// party was left or disbanded in between. A retry will succeed, hence 409.
/// Busy timeouts and I/O failures become a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            tracing::warn!(error = %db_err, "Lost a membership race on a unique index");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Request conflicts with existing state".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Lobby store unavailable");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
