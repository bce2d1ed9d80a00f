//! Auth data models.

use jiff::Timestamp;

use crate::domain::users::records::UserId;

/// Credential state read during bearer authentication.
#[derive(Debug, Clone)]
pub(crate) struct TokenGrant {
    /// User that owns the token.
    pub user_id: UserId,

    /// Absolute expiry; `None` never expires.
    pub expires_at: Option<Timestamp>,

    /// False when either the token or its user is disabled.
    pub enabled: bool,
}

/// API token metadata persisted in storage.
#[derive(Debug, Clone)]
pub struct ApiTokenMetadata {
    /// Leading characters of the token, enough to tell tokens apart.
    pub token_prefix: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub disabled_at: Option<Timestamp>,
}

/// New API token persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewApiToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// API token issuance result with one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub metadata: ApiTokenMetadata,
}
