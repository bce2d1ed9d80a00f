//! Passes service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Sqlite, Transaction};
use tracing::{Span, debug};

use crate::{
    auth::authenticate_bearer,
    database::Db,
    domain::{
        passes::{
            PassesServiceError, SqlitePassStore,
            data::{NewPublish, PassedNodeIds},
            records::{DepHash, NodeId},
        },
        usage::records::{UsageEvent, UsageKind},
        users::records::UserId,
    },
    pipeline::{Intent, PipelineHandle, PublishIntent},
};

#[derive(Debug, Clone)]
pub struct SqlitePassesService {
    db: Db,
    store: SqlitePassStore,
    pipeline: PipelineHandle,
}

impl SqlitePassesService {
    #[must_use]
    pub fn new(db: Db, pipeline: PipelineHandle) -> Self {
        Self {
            db,
            store: SqlitePassStore::new(),
            pipeline,
        }
    }

    async fn authenticate_at(
        &self,
        bearer_token: &str,
        now: Timestamp,
    ) -> Result<UserId, PassesServiceError> {
        let mut tx = self.db.begin_read().await?;
        let user = authenticate_bearer(&mut tx, bearer_token, now).await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Validate the hashes and read their records, ending `tx` either way.
    async fn read_passed(
        &self,
        mut tx: Transaction<'static, Sqlite>,
        user: UserId,
        dep_hashes: Vec<String>,
    ) -> Result<Vec<Vec<NodeId>>, PassesServiceError> {
        let dep_hashes = dep_hashes
            .into_iter()
            .map(DepHash::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let results = self.store.query_passed(&mut tx, user, &dep_hashes).await?;

        tx.commit().await?;

        Ok(results)
    }
}

#[async_trait]
impl PassesService for SqlitePassesService {
    #[tracing::instrument(name = "passes.service.authenticate", skip(self, bearer_token), err)]
    async fn authenticate(&self, bearer_token: &str) -> Result<UserId, PassesServiceError> {
        self.authenticate_at(bearer_token, Timestamp::now()).await
    }

    #[tracing::instrument(
        name = "passes.service.query_passed",
        skip(self, bearer_token, dep_hashes),
        fields(user_id = tracing::field::Empty, dep_hash_count = dep_hashes.len()),
        err
    )]
    async fn query_passed(
        &self,
        bearer_token: &str,
        dep_hashes: Vec<String>,
    ) -> Result<Vec<Vec<String>>, PassesServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin_read().await?;

        let user = authenticate_bearer(&mut tx, bearer_token, now).await?;

        Span::current().record("user_id", tracing::field::display(user));

        let results = self.read_passed(tx, user, dep_hashes).await;

        // The read transaction is over before any wait for queue space.
        self.pipeline
            .enqueue(UsageEvent::new(user, UsageKind::Query, now))
            .await?;

        let results = results?;
        let hits = results.iter().filter(|node_ids| !node_ids.is_empty()).count();

        debug!(hits, "queried passed node ids");

        Ok(results
            .into_iter()
            .map(|node_ids| node_ids.into_iter().map(NodeId::into_string).collect())
            .collect())
    }

    #[tracing::instrument(
        name = "passes.service.publish_passed",
        skip(self, bearer_token, publish),
        fields(
            user_id = tracing::field::Empty,
            dep_hash_count = publish.passed_node_ids.len()
        ),
        err
    )]
    async fn publish_passed(
        &self,
        bearer_token: &str,
        publish: NewPublish,
    ) -> Result<(), PassesServiceError> {
        let now = Timestamp::now();
        let user = self.authenticate_at(bearer_token, now).await?;

        Span::current().record("user_id", tracing::field::display(user));

        let usage = Intent::Usage(UsageEvent::new(user, UsageKind::Publish, now));

        let passed = match PassedNodeIds::parse(publish.passed_node_ids) {
            Ok(passed) => passed,
            Err(error) => {
                self.pipeline.enqueue(usage).await?;

                return Err(error.into());
            }
        };

        self.pipeline
            .enqueue_all(vec![
                usage,
                Intent::Publish(PublishIntent {
                    user_id: user,
                    passed,
                    summary: publish.summary,
                }),
            ])
            .await?;

        Ok(())
    }
}

/// Request-path operations on pass records.
///
/// Query and publish authenticate the bearer token first and record one
/// usage event once it resolves.
#[automock]
#[async_trait]
pub trait PassesService: Send + Sync {
    /// Resolve a bearer token without recording usage.
    async fn authenticate(&self, bearer_token: &str) -> Result<UserId, PassesServiceError>;

    /// Node ids on record for each dependency hash, in input order.
    async fn query_passed(
        &self,
        bearer_token: &str,
        dep_hashes: Vec<String>,
    ) -> Result<Vec<Vec<String>>, PassesServiceError>;

    /// Validate a publish and queue it. Storage is updated by the pipeline
    /// after this returns.
    async fn publish_passed(
        &self,
        bearer_token: &str,
        publish: NewPublish,
    ) -> Result<(), PassesServiceError>;
}
