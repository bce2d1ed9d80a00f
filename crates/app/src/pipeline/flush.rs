//! Batch application

use std::time::Instant;

use jiff::Timestamp;
use sqlx::SqliteConnection;
use tracing::{debug, error};

use crate::{
    database::begin_immediate,
    domain::{
        passes::{PassesError, SqlitePassStore},
        usage::SqliteUsageRepository,
    },
    pipeline::{FlushOutcome, Intent, PipelineObserver},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlushStats {
    pub usage_events: usize,
    pub publishes: usize,
    pub records_merged: usize,
    pub records_rejected: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BatchWriter {
    store: SqlitePassStore,
    usage: SqliteUsageRepository,
}

impl BatchWriter {
    pub(crate) fn new() -> Self {
        Self {
            store: SqlitePassStore::new(),
            usage: SqliteUsageRepository::new(),
        }
    }

    /// Apply and clear `pending`, reporting the outcome to `observer`.
    pub(crate) async fn flush(
        &self,
        conn: &mut SqliteConnection,
        pending: &mut Vec<Intent>,
        observer: &dyn PipelineObserver,
    ) {
        if pending.is_empty() {
            return;
        }

        let intents = std::mem::take(pending);
        let started = Instant::now();

        let result = self.apply(conn, &intents).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(stats) => {
                debug!(
                    intents = intents.len(),
                    usage_events = stats.usage_events,
                    publishes = stats.publishes,
                    records_merged = stats.records_merged,
                    records_rejected = stats.records_rejected,
                    elapsed_ms = elapsed.as_millis(),
                    "flushed pipeline batch"
                );

                FlushOutcome::Committed
            }
            Err(error) => {
                error!(
                    intents = intents.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "pipeline batch rolled back: {error}"
                );

                FlushOutcome::RolledBack
            }
        };

        observer.flush_completed(outcome, intents.len(), elapsed);
    }

    /// Write every intent inside one immediate transaction.
    ///
    /// Rejected pass record updates are skipped. Any storage failure drops
    /// the transaction, which rolls back the whole batch.
    pub(crate) async fn apply(
        &self,
        conn: &mut SqliteConnection,
        intents: &[Intent],
    ) -> Result<FlushStats, PassesError> {
        let mut tx = begin_immediate(conn).await?;
        let now = Timestamp::now();
        let mut stats = FlushStats::default();

        for intent in intents {
            match intent {
                Intent::Usage(event) => {
                    self.usage.insert_usage(&mut tx, event).await?;

                    stats.usage_events += 1;
                }
                Intent::Publish(publish) => {
                    let report = self
                        .store
                        .publish_passed(&mut tx, publish.user_id, &publish.passed, now)
                        .await?;

                    debug!(
                        user = %publish.user_id,
                        dep_hashes = publish.passed.len(),
                        merged = report.merged,
                        rejected = report.rejected.len(),
                        total_tests = publish.summary.total,
                        passed_tests = publish.summary.passed,
                        failed_tests = publish.summary.failed,
                        skipped_tests = publish.summary.skipped,
                        skipped_by_cache_tests = publish.summary.skipped_by_cache,
                        "applied publish"
                    );

                    stats.publishes += 1;
                    stats.records_merged += report.merged;
                    stats.records_rejected += report.rejected.len();
                }
            }
        }

        tx.commit().await?;

        Ok(stats)
    }
}
