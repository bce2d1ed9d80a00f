//! Usage repository.

use sqlx::{SqliteConnection, query};

use crate::{domain::usage::records::UsageEvent, timestamps::to_unix};

const INSERT_USAGE_SQL: &str = include_str!("sql/insert_usage.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SqliteUsageRepository;

impl SqliteUsageRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_usage(
        &self,
        conn: &mut SqliteConnection,
        event: &UsageEvent,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_USAGE_SQL)
            .bind(to_unix(event.timestamp))
            .bind(event.user_id.into_i64())
            .bind(event.kind.as_i64())
            .bind(1_i64)
            .execute(conn)
            .await?;

        Ok(())
    }
}
