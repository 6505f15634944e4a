//! Error taxonomy for the match engine.
//!
//! Every engine operation returns `Result<_, EngineError>`. The variants map
//! one-to-one onto HTTP statuses at the route boundary; none of them is fatal
//! to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown invitation, session, or pool item.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor is not allowed to perform the operation (not a participant,
    /// not the sender/receiver, or not an eligible pair).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation is illegal for the current lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Uniqueness violation: duplicate invite or open session for a pair.
    ///
    /// A losing race on mutual-match insertion is NOT surfaced as this
    /// variant - it is swallowed inside the preference recorder.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No verified identity on the request.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
            EngineError::Database(_) | EngineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// True when the root cause is a Postgres unique-constraint violation.
///
/// Used to translate losing races on the partial unique indexes into
/// `Conflict` instead of a 500. Model methods return `anyhow::Result`, so
/// this digs the sqlx error back out.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
