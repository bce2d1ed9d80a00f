//! Auth service.

use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::SqliteConnection;

use crate::{
    auth::{
        ApiTokenMetadata, AuthError, AuthServiceError, IssuedApiToken, MAX_BEARER_TOKEN_LEN,
        NewApiToken, SqliteAuthRepository, format_api_token, generate_api_token_secret,
    },
    database::Db,
    domain::users::records::UserId,
};

/// Resolve a bearer token to the user it belongs to.
///
/// Runs on the caller's connection so the lookup shares whatever
/// transaction the request already holds.
///
/// # Errors
///
/// Fails with the first failing check in order: unknown token, expired,
/// disabled token or user.
pub async fn authenticate_bearer(
    conn: &mut SqliteConnection,
    bearer_token: &str,
    now: Timestamp,
) -> Result<UserId, AuthError> {
    if bearer_token.is_empty() || bearer_token.len() > MAX_BEARER_TOKEN_LEN {
        return Err(AuthError::InvalidToken);
    }

    let grant = SqliteAuthRepository::new()
        .find_token_grant(conn, bearer_token)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if grant.expires_at.is_some_and(|expires_at| now > expires_at) {
        return Err(AuthError::Expired);
    }

    if !grant.enabled {
        return Err(AuthError::Disabled);
    }

    Ok(grant.user_id)
}

/// Mint and store a token for `user` on the caller's connection.
///
/// A `ttl` of `None` never expires.
///
/// # Errors
///
/// Returns an error when the lifetime overflows or the user does not exist.
pub(crate) async fn issue_api_token_on(
    conn: &mut SqliteConnection,
    user: UserId,
    ttl: Option<Duration>,
    now: Timestamp,
) -> Result<IssuedApiToken, AuthServiceError> {
    let expires_at = ttl
        .map(|ttl| {
            SignedDuration::try_from(ttl)
                .ok()
                .and_then(|ttl| now.checked_add(ttl).ok())
                .ok_or(AuthServiceError::InvalidTtl)
        })
        .transpose()?;

    let secret = generate_api_token_secret();
    let token = format_api_token(&secret);

    let metadata = SqliteAuthRepository::new()
        .create_api_token(
            conn,
            &NewApiToken {
                token: token.clone(),
                user_id: user,
                created_at: now,
                expires_at,
            },
        )
        .await?;

    Ok(IssuedApiToken { token, metadata })
}

#[derive(Debug, Clone)]
pub struct SqliteAuthService {
    db: Db,
    repository: SqliteAuthRepository,
}

impl SqliteAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteAuthRepository::new(),
        }
    }
}

#[async_trait]
impl AuthService for SqliteAuthService {
    async fn issue_api_token(
        &self,
        user: UserId,
        ttl: Option<Duration>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let mut tx = self.db.begin_write().await?;

        let issued = issue_api_token_on(&mut tx, user, ttl, Timestamp::now()).await?;

        tx.commit().await?;

        Ok(issued)
    }

    async fn list_api_tokens(
        &self,
        user: UserId,
    ) -> Result<Vec<ApiTokenMetadata>, AuthServiceError> {
        let mut tx = self.db.begin_read().await?;

        let tokens = self.repository.list_api_tokens(&mut tx, user).await?;

        tx.commit().await?;

        Ok(tokens)
    }

    async fn disable_api_token(&self, token: &str) -> Result<(), AuthServiceError> {
        let mut tx = self.db.begin_write().await?;

        let rows_affected = self
            .repository
            .disable_api_token(&mut tx, token, Timestamp::now())
            .await?;

        if rows_affected == 0 {
            return Err(AuthServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Administrative token operations.
#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Issue a new token. The plaintext is returned here and never again.
    async fn issue_api_token(
        &self,
        user: UserId,
        ttl: Option<Duration>,
    ) -> Result<IssuedApiToken, AuthServiceError>;

    async fn list_api_tokens(&self, user: UserId)
    -> Result<Vec<ApiTokenMetadata>, AuthServiceError>;

    /// Disable an active token.
    async fn disable_api_token(&self, token: &str) -> Result<(), AuthServiceError>;
}
