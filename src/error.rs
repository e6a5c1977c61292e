use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// The application-wide error taxonomy. Every fallible path in the handlers,
/// auth service, and repository funnels into one of these variants, and the
/// `IntoResponse` impl below is the single place where errors are turned into
/// HTTP status codes and the `{"error": "..."}` JSON payload.
#[derive(Error, Debug)]
pub enum AppError {
    /// Uniform authentication failure. Deliberately covers both "unknown
    /// username" and "wrong password" so the response never reveals whether
    /// an account exists.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration rejected because the username or email is already taken.
    #[error("username or email already in use")]
    DuplicateUser,

    /// Request payload failed validation before any business logic ran.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired session token on a session-bound route.
    #[error("authentication required")]
    Unauthenticated,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Failure while signing a session token. Validation failures on incoming
    /// tokens map to `Unauthenticated` instead.
    #[error("session token error")]
    SessionToken(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidCredentials | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            e @ (AppError::Database(_)
            | AppError::PasswordHash(_)
            | AppError::SessionToken(_)) => {
                // Internal failures are logged with their cause chain but the
                // client only ever sees a generic message.
                tracing::error!(error.cause_chain = ?e, error.message = %e, "unexpected error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
