//! Pass record store.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use sqlx::SqliteConnection;
use tracing::warn;

use crate::domain::{
    passes::{
        PassesError, SqlitePassesRepository,
        codec::{decode_node_ids, encode_node_ids},
        data::PassedNodeIds,
        records::{DepHash, MAX_NODE_IDS_PER_DEP_HASH, NodeId},
    },
    users::records::UserId,
};

/// Outcome of applying one publish.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Dependency hashes whose record was written.
    pub merged: usize,

    /// Dependency hashes left untouched, with the reason.
    pub rejected: Vec<(DepHash, PassesError)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePassStore {
    repository: SqlitePassesRepository,
}

impl SqlitePassStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: SqlitePassesRepository::new(),
        }
    }

    /// Look up the node ids on record for each dependency hash.
    ///
    /// The result lines up with `dep_hashes`; hashes without a record map
    /// to an empty list. Run it inside one transaction so every lookup sees
    /// the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PassesError::Corrupt`] when a stored blob cannot be decoded.
    pub async fn query_passed(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        dep_hashes: &[DepHash],
    ) -> Result<Vec<Vec<NodeId>>, PassesError> {
        let mut results = Vec::with_capacity(dep_hashes.len());

        for dep_hash in dep_hashes {
            let node_ids = match self.repository.get_node_ids(conn, user, dep_hash).await? {
                Some(blob) => decode_node_ids(&blob)?,
                None => Vec::new(),
            };

            results.push(node_ids);
        }

        Ok(results)
    }

    /// Union `node_ids` into the record for `dep_hash` and refresh its
    /// access time. Returns the size of the stored set.
    ///
    /// # Errors
    ///
    /// Returns [`PassesError::QuotaExceeded`] without writing when the union
    /// would hold more ids than a record allows.
    pub async fn merge_passed(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        dep_hash: &DepHash,
        node_ids: &FxHashSet<NodeId>,
        now: Timestamp,
    ) -> Result<usize, PassesError> {
        let mut merged: FxHashSet<NodeId> = match self
            .repository
            .get_node_ids(conn, user, dep_hash)
            .await?
        {
            Some(blob) => decode_node_ids(&blob)?.into_iter().collect(),
            None => FxHashSet::default(),
        };

        merged.extend(node_ids.iter().cloned());

        if merged.len() > MAX_NODE_IDS_PER_DEP_HASH {
            return Err(PassesError::QuotaExceeded {
                count: merged.len(),
            });
        }

        let blob = encode_node_ids(&merged);

        self.repository
            .upsert_node_ids(conn, user, dep_hash, &blob, now)
            .await?;

        Ok(merged.len())
    }

    /// Merge every entry of a publish independently.
    ///
    /// A rejected entry does not stop the others. Storage failures abort
    /// immediately so the caller can roll the transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`PassesError::Sql`] on storage failure.
    pub async fn publish_passed(
        &self,
        conn: &mut SqliteConnection,
        user: UserId,
        passed: &PassedNodeIds,
        now: Timestamp,
    ) -> Result<PublishReport, PassesError> {
        let mut report = PublishReport::default();

        for (dep_hash, node_ids) in passed.iter() {
            match self.merge_passed(conn, user, dep_hash, node_ids, now).await {
                Ok(_) => report.merged += 1,
                Err(error) if error.is_domain() => {
                    warn!(%user, %dep_hash, %error, "rejected pass record update");

                    report.rejected.push((dep_hash.clone(), error));
                }
                Err(error) => return Err(error),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sqlx::query;
    use testresult::TestResult;

    use crate::{
        database::begin_immediate,
        domain::users::{SqliteUsersService, UsersService, UsersServiceError},
        test::TestDb,
    };

    use super::*;

    fn dep_hash(c: char) -> DepHash {
        DepHash::parse(c.to_string().repeat(64)).unwrap_or_else(|_| unreachable!())
    }

    fn node_ids(range: std::ops::Range<usize>) -> FxHashSet<NodeId> {
        range
            .map(|n| NodeId::parse(format!("{n:032x}")).unwrap_or_else(|_| unreachable!()))
            .collect()
    }

    fn sorted(mut ids: Vec<NodeId>) -> Vec<NodeId> {
        ids.sort();
        ids
    }

    async fn new_user(test_db: &TestDb) -> Result<UserId, UsersServiceError> {
        Ok(SqliteUsersService::new(test_db.db.clone())
            .create_user()
            .await?
            .id)
    }

    async fn merge(
        test_db: &TestDb,
        user: UserId,
        dep_hash: &DepHash,
        ids: &FxHashSet<NodeId>,
    ) -> Result<usize, PassesError> {
        let mut writer = test_db.db.open_writer().await?;
        let mut tx = begin_immediate(&mut writer).await?;

        let count = SqlitePassStore::new()
            .merge_passed(&mut tx, user, dep_hash, ids, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(count)
    }

    async fn query_one(
        test_db: &TestDb,
        user: UserId,
        dep_hash: &DepHash,
    ) -> Result<Vec<NodeId>, PassesError> {
        let mut tx = test_db.db.begin_read().await?;

        let mut results = SqlitePassStore::new()
            .query_passed(&mut tx, user, std::slice::from_ref(dep_hash))
            .await?;

        Ok(results.pop().unwrap_or_default())
    }

    #[tokio::test]
    async fn unknown_dep_hash_yields_empty_list() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;

        let mut tx = test_db.db.begin_read().await?;

        let results = SqlitePassStore::new()
            .query_passed(&mut tx, user, &[dep_hash('a'), dep_hash('b')])
            .await?;

        assert_eq!(results, vec![Vec::<NodeId>::new(), Vec::new()]);

        Ok(())
    }

    #[tokio::test]
    async fn query_results_align_with_input_order() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;

        merge(&test_db, user, &dep_hash('b'), &node_ids(0..2)).await?;

        let mut tx = test_db.db.begin_read().await?;

        let results = SqlitePassStore::new()
            .query_passed(&mut tx, user, &[dep_hash('a'), dep_hash('b'), dep_hash('a')])
            .await?;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_empty());
        assert_eq!(results[1].len(), 2);
        assert!(results[2].is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn publishes_accumulate_as_union() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;
        let hash = dep_hash('c');

        merge(&test_db, user, &hash, &node_ids(0..3)).await?;
        merge(&test_db, user, &hash, &node_ids(2..5)).await?;
        merge(&test_db, user, &hash, &node_ids(0..1)).await?;

        let stored = sorted(query_one(&test_db, user, &hash).await?);

        assert_eq!(stored, sorted(node_ids(0..5).into_iter().collect()));

        Ok(())
    }

    #[tokio::test]
    async fn records_are_isolated_per_user() -> TestResult {
        let test_db = TestDb::new().await?;
        let alice = new_user(&test_db).await?;
        let bob = new_user(&test_db).await?;
        let hash = dep_hash('d');

        merge(&test_db, alice, &hash, &node_ids(0..4)).await?;

        assert!(query_one(&test_db, bob, &hash).await?.is_empty());
        assert_eq!(query_one(&test_db, alice, &hash).await?.len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn filling_to_ceiling_succeeds_and_one_more_is_rejected() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;
        let hash = dep_hash('e');

        let count = merge(&test_db, user, &hash, &node_ids(0..MAX_NODE_IDS_PER_DEP_HASH)).await?;

        assert_eq!(count, MAX_NODE_IDS_PER_DEP_HASH);

        let over = node_ids(MAX_NODE_IDS_PER_DEP_HASH..MAX_NODE_IDS_PER_DEP_HASH + 1);
        let result = merge(&test_db, user, &hash, &over).await;

        assert!(
            matches!(result, Err(PassesError::QuotaExceeded { count }) if count == MAX_NODE_IDS_PER_DEP_HASH + 1),
            "got {result:?}"
        );

        assert_eq!(
            query_one(&test_db, user, &hash).await?.len(),
            MAX_NODE_IDS_PER_DEP_HASH
        );

        // Already-known ids do not count against the ceiling.
        assert_eq!(merge(&test_db, user, &hash, &node_ids(0..10)).await?, MAX_NODE_IDS_PER_DEP_HASH);

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_blob_fails_instead_of_truncating() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;
        let hash = dep_hash('f');

        query("INSERT INTO test_results (user_id, dep_hash, accessed_at, node_ids) VALUES (?, ?, 0, ?)")
            .bind(user.into_i64())
            .bind(hash.as_str())
            .bind(vec![b'a'; 33])
            .execute(test_db.db.pool())
            .await?;

        let result = query_one(&test_db, user, &hash).await;

        assert!(matches!(result, Err(PassesError::Corrupt { len: 33 })), "got {result:?}");

        let result = merge(&test_db, user, &hash, &node_ids(0..1)).await;

        assert!(matches!(result, Err(PassesError::Corrupt { len: 33 })), "got {result:?}");

        Ok(())
    }

    #[tokio::test]
    async fn publish_continues_past_rejected_entry() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;

        merge(&test_db, user, &dep_hash('a'), &node_ids(0..MAX_NODE_IDS_PER_DEP_HASH)).await?;

        let mut raw = BTreeMap::new();

        raw.insert("a".repeat(64), vec![format!("{:032x}", MAX_NODE_IDS_PER_DEP_HASH)]);
        raw.insert("b".repeat(64), vec!["1".repeat(32)]);

        let passed = PassedNodeIds::parse(raw)?;

        let mut writer = test_db.db.open_writer().await?;
        let mut tx = begin_immediate(&mut writer).await?;

        let report = SqlitePassStore::new()
            .publish_passed(&mut tx, user, &passed, Timestamp::now())
            .await?;

        tx.commit().await?;

        assert_eq!(report.merged, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, dep_hash('a'));
        assert_eq!(query_one(&test_db, user, &dep_hash('b')).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn stored_blob_is_sorted_and_packed() -> TestResult {
        let test_db = TestDb::new().await?;
        let user = new_user(&test_db).await?;
        let hash = dep_hash('9');

        merge(&test_db, user, &hash, &node_ids(0..3)).await?;

        let blob: Vec<u8> = sqlx::query_scalar("SELECT node_ids FROM test_results WHERE dep_hash = ?")
            .bind(hash.as_str())
            .fetch_one(test_db.db.pool())
            .await?;

        let expected = format!("{:032x}{:032x}{:032x}", 0, 1, 2);

        assert_eq!(blob, expected.into_bytes());

        Ok(())
    }
}
