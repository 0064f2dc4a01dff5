use axum::http::StatusCode;
use thiserror::Error;

use crate::repos::error::StoreError;

/// Failures of the token lifecycle.
///
/// Every variant carries its own HTTP status (`status()`) and a human-readable
/// message (`Display`). Nothing here is retried; callers propagate one level up.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong username or password.")]
    InvalidCredentials,

    #[error("We encountered a problem generating the token. Please try again.")]
    TokenGenerationFailed,

    #[error("We encountered a problem saving the token. Please try again.")]
    PersistenceFailed,

    // Also covers tokens that were swept; the two cases are not told apart.
    #[error("Token timed out.")]
    TokenExpiredOrUnknown,

    #[error("Token doesn't match username.")]
    TokenUsernameMismatch,

    #[error("Stored access level is not a number.")]
    MalformedAccessLevel,

    #[error("Token is malformed.")]
    MalformedToken,

    #[error("No such account.")]
    UnknownAccount,

    #[error("Configured token lifetime is out of range.")]
    LifetimeOutOfRange,

    #[error("Credential store failure.")]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::FORBIDDEN,
            AuthError::TokenGenerationFailed | AuthError::PersistenceFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::TokenExpiredOrUnknown | AuthError::MalformedToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TokenUsernameMismatch => StatusCode::FORBIDDEN,
            AuthError::MalformedAccessLevel
            | AuthError::LifetimeOutOfRange
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::UnknownAccount => StatusCode::NOT_FOUND,
        }
    }

    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
            AuthError::PersistenceFailed => "PERSISTENCE_FAILED",
            AuthError::TokenExpiredOrUnknown => "TOKEN_EXPIRED_OR_UNKNOWN",
            AuthError::TokenUsernameMismatch => "TOKEN_USERNAME_MISMATCH",
            AuthError::MalformedAccessLevel => "MALFORMED_ACCESS_LEVEL",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::UnknownAccount => "UNKNOWN_ACCOUNT",
            AuthError::LifetimeOutOfRange => "LIFETIME_OUT_OF_RANGE",
            AuthError::Store(_) => "STORE_FAILURE",
        }
    }
}
