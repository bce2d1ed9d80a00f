//! Pass records repository.

use jiff::Timestamp;
use sqlx::{Sqlite, SqliteConnection, query, query_scalar};

use crate::{
    domain::{passes::records::DepHash, users::records::UserId},
    timestamps::to_unix,
};

const GET_NODE_IDS_SQL: &str = include_str!("sql/get_node_ids.sql");
const UPSERT_NODE_IDS_SQL: &str = include_str!("sql/upsert_node_ids.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SqlitePassesRepository;

impl SqlitePassesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_node_ids(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        dep_hash: &DepHash,
    ) -> Result<Option<Vec<u8>>, sqlx::Error> {
        query_scalar::<Sqlite, Vec<u8>>(GET_NODE_IDS_SQL)
            .bind(user.into_i64())
            .bind(dep_hash.as_str())
            .fetch_optional(conn)
            .await
    }

    pub(crate) async fn upsert_node_ids(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        dep_hash: &DepHash,
        blob: &[u8],
        accessed_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_NODE_IDS_SQL)
            .bind(user.into_i64())
            .bind(dep_hash.as_str())
            .bind(to_unix(accessed_at))
            .bind(blob)
            .execute(conn)
            .await?;

        Ok(())
    }
}
