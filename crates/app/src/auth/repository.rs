//! Auth repository.

use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, query_scalar, sqlite::SqliteRow};

use crate::{
    auth::{ApiTokenMetadata, NewApiToken, models::TokenGrant, token_display_prefix},
    domain::users::records::UserId,
    timestamps::{get_optional_timestamp, get_timestamp, to_unix},
};

const FIND_TOKEN_GRANT_SQL: &str = include_str!("sql/find_token_grant.sql");
const CREATE_API_TOKEN_SQL: &str = include_str!("sql/create_api_token.sql");
const LIST_API_TOKENS_SQL: &str = include_str!("sql/list_api_tokens.sql");
const COUNT_API_TOKENS_SQL: &str = include_str!("sql/count_api_tokens.sql");
const DISABLE_API_TOKEN_SQL: &str = include_str!("sql/disable_api_token.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SqliteAuthRepository;

impl SqliteAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_token_grant(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<TokenGrant>, sqlx::Error> {
        query_as::<Sqlite, TokenGrant>(FIND_TOKEN_GRANT_SQL)
            .bind(token)
            .fetch_optional(conn)
            .await
    }

    pub(crate) async fn create_api_token(
        &self,
        conn: &mut SqliteConnection,
        token: &NewApiToken,
    ) -> Result<ApiTokenMetadata, sqlx::Error> {
        query_as::<Sqlite, ApiTokenMetadata>(CREATE_API_TOKEN_SQL)
            .bind(&token.token)
            .bind(token.user_id.into_i64())
            .bind(to_unix(token.created_at))
            .bind(token.expires_at.map(to_unix))
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn list_api_tokens(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
    ) -> Result<Vec<ApiTokenMetadata>, sqlx::Error> {
        query_as::<Sqlite, ApiTokenMetadata>(LIST_API_TOKENS_SQL)
            .bind(user.into_i64())
            .fetch_all(conn)
            .await
    }

    pub(crate) async fn count_api_tokens(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Sqlite, i64>(COUNT_API_TOKENS_SQL)
            .bind(user.into_i64())
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn disable_api_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
        disabled_at: jiff::Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DISABLE_API_TOKEN_SQL)
            .bind(to_unix(disabled_at))
            .bind(token)
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, SqliteRow> for TokenGrant {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_id: UserId::from_i64(row.try_get("user_id")?),
            expires_at: get_optional_timestamp(row, "expires_at")?,
            enabled: row.try_get("enabled")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for ApiTokenMetadata {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let token: String = row.try_get("token")?;

        Ok(Self {
            token_prefix: token_display_prefix(&token),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            created_at: get_timestamp(row, "created_at")?,
            expires_at: get_optional_timestamp(row, "expires_at")?,
            disabled_at: get_optional_timestamp(row, "disabled_at")?,
        })
    }
}
