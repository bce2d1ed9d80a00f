//! Auth errors.

use sqlx::Error;
use thiserror::Error;

/// Why a bearer credential did not resolve to a user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("token disabled")]
    Disabled,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("token not found")]
    NotFound,

    #[error("user not found")]
    UnknownUser,

    #[error("token lifetime is out of range")]
    InvalidTtl,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        let foreign_key_violation = error
            .as_database_error()
            .is_some_and(|database_error| database_error.is_foreign_key_violation());

        if foreign_key_violation {
            return Self::UnknownUser;
        }

        Self::Sql(error)
    }
}
