//! Users Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, sqlite::SqliteRow};

use crate::{
    domain::users::records::{UserId, UserRecord},
    timestamps::{get_optional_timestamp, get_timestamp, to_unix},
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const LIST_SUPERUSERS_SQL: &str = include_str!("sql/list_superusers.sql");
const SET_USER_DISABLED_AT_SQL: &str = include_str!("sql/set_user_disabled_at.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SqliteUsersRepository;

impl SqliteUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        conn: &mut SqliteConnection,
        now: Timestamp,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Sqlite, UserRecord>(CREATE_USER_SQL)
            .bind(to_unix(now))
            .fetch_one(conn)
            .await
    }

    pub(crate) async fn get_user(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Sqlite, UserRecord>(GET_USER_SQL)
            .bind(user.into_i64())
            .fetch_optional(conn)
            .await
    }

    pub(crate) async fn list_superusers(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<UserRecord>, sqlx::Error> {
        query_as::<Sqlite, UserRecord>(LIST_SUPERUSERS_SQL)
            .fetch_all(conn)
            .await
    }

    pub(crate) async fn set_disabled_at(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        disabled_at: Option<Timestamp>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_USER_DISABLED_AT_SQL)
            .bind(disabled_at.map(to_unix))
            .bind(user.into_i64())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, SqliteRow> for UserRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: UserId::from_i64(row.try_get("id")?),
            superuser: row.try_get("superuser")?,
            created_at: get_timestamp(row, "created_at")?,
            disabled_at: get_optional_timestamp(row, "disabled_at")?,
        })
    }
}
