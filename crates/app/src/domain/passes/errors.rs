//! Pass record and passes service errors.

use sqlx::Error;
use thiserror::Error;

use crate::{
    auth::AuthError,
    database::is_unavailable,
    domain::passes::records::{DEP_HASH_LEN, MAX_NODE_IDS_PER_DEP_HASH, NODE_ID_LEN},
    pipeline::EnqueueError,
};

#[derive(Debug, Error)]
pub enum PassesError {
    #[error("dependency hash must be {} hex characters", DEP_HASH_LEN)]
    InvalidDepHash,

    #[error("node id must be {} hex characters", NODE_ID_LEN)]
    InvalidNodeId,

    #[error("{count} node ids exceed the limit of {} per dependency hash", MAX_NODE_IDS_PER_DEP_HASH)]
    QuotaExceeded { count: usize },

    #[error("stored node id blob of {len} bytes is corrupt")]
    Corrupt { len: usize },

    #[error("storage error")]
    Sql(#[from] Error),
}

impl PassesError {
    /// Whether the failure concerns only the input or row at hand, as
    /// opposed to the storage connection.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Sql(_))
    }
}

/// Why a bearer credential was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    InvalidToken,
    Expired,
    Disabled,
}

impl UnauthorizedReason {
    /// Fixed, client-facing description.
    #[must_use]
    pub const fn brief(self) -> &'static str {
        match self {
            Self::InvalidToken => "Invalid token",
            Self::Expired => "Token expired",
            Self::Disabled => "Token disabled",
        }
    }
}

#[derive(Debug, Error)]
pub enum PassesServiceError {
    #[error("unauthorized: {}", .0.brief())]
    Unauthorized(UnauthorizedReason),

    #[error("invalid input: {0}")]
    InvalidInput(#[source] PassesError),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(#[source] PassesError),

    #[error("service unavailable")]
    Unavailable,

    #[error("internal error")]
    Internal(#[source] PassesError),
}

impl From<PassesError> for PassesServiceError {
    fn from(error: PassesError) -> Self {
        match error {
            PassesError::InvalidDepHash | PassesError::InvalidNodeId => Self::InvalidInput(error),
            PassesError::QuotaExceeded { .. } => Self::QuotaExceeded(error),
            PassesError::Corrupt { .. } => Self::Internal(error),
            PassesError::Sql(error) => Self::from(error),
        }
    }
}

impl From<Error> for PassesServiceError {
    fn from(error: Error) -> Self {
        if is_unavailable(&error) {
            return Self::Unavailable;
        }

        Self::Internal(PassesError::Sql(error))
    }
}

impl From<AuthError> for PassesServiceError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidToken => Self::Unauthorized(UnauthorizedReason::InvalidToken),
            AuthError::Expired => Self::Unauthorized(UnauthorizedReason::Expired),
            AuthError::Disabled => Self::Unauthorized(UnauthorizedReason::Disabled),
            AuthError::Sql(error) => Self::from(error),
        }
    }
}

impl From<EnqueueError> for PassesServiceError {
    fn from(_error: EnqueueError) -> Self {
        Self::Unavailable
    }
}
