//! Test context for service-level tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, time::timeout};

use crate::{
    auth::{AuthService, SqliteAuthService},
    domain::{
        passes::SqlitePassesService,
        users::{SqliteUsersService, UsersService},
    },
    pipeline::{FlushOutcome, Pipeline, PipelineConfig, PipelineObserver},
};

use super::{TestDb, TestSetupError};

const TEST_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on how long `settle` waits for the worker.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts intents in and out of the pipeline.
#[derive(Debug)]
struct FlushTracker {
    enqueued: AtomicUsize,
    flushed: watch::Sender<usize>,
}

impl FlushTracker {
    fn new() -> Self {
        Self {
            enqueued: AtomicUsize::new(0),
            flushed: watch::Sender::new(0),
        }
    }
}

impl PipelineObserver for FlushTracker {
    fn intents_enqueued(&self, count: usize) {
        self.enqueued.fetch_add(count, Ordering::SeqCst);
    }

    fn flush_completed(&self, _outcome: FlushOutcome, intents: usize, _elapsed: Duration) {
        self.flushed.send_modify(|flushed| *flushed += intents);
    }
}

/// Fresh database with a running pipeline and the services on top.
#[derive(Debug)]
pub(crate) struct TestContext {
    pub db: TestDb,
    pub passes: SqlitePassesService,
    pub users: SqliteUsersService,
    pub auth: SqliteAuthService,

    tracker: Arc<FlushTracker>,
    _pipeline: Pipeline,
}

impl TestContext {
    pub(crate) async fn new() -> Result<Self, TestSetupError> {
        Self::with_flush_interval(TEST_FLUSH_INTERVAL).await
    }

    pub(crate) async fn with_flush_interval(
        flush_interval: Duration,
    ) -> Result<Self, TestSetupError> {
        let db = TestDb::new().await?;
        let tracker = Arc::new(FlushTracker::new());

        let pipeline = Pipeline::spawn(
            &db.db,
            PipelineConfig {
                flush_interval,
                ..PipelineConfig::default()
            },
            tracker.clone(),
        )
        .await?;

        Ok(Self {
            passes: SqlitePassesService::new(db.db.clone(), pipeline.handle()),
            users: SqliteUsersService::new(db.db.clone()),
            auth: SqliteAuthService::new(db.db.clone()),
            db,
            tracker,
            _pipeline: pipeline,
        })
    }

    /// Create a new user and return a fresh, non-expiring token for it.
    pub(crate) async fn issue_token(&self) -> Result<String, TestSetupError> {
        let user = self.users.create_user().await?;
        let issued = self.auth.issue_api_token(user.id, None).await?;

        Ok(issued.token)
    }

    /// Wait until every intent queued so far has gone through a flush.
    pub(crate) async fn settle(&self) {
        let target = self.tracker.enqueued.load(Ordering::SeqCst);
        let mut flushed = self.tracker.flushed.subscribe();

        let settled = timeout(SETTLE_TIMEOUT, async {
            flushed
                .wait_for(|flushed| *flushed >= target)
                .await
                .is_ok()
        })
        .await
        .unwrap_or(false);

        assert!(settled, "pipeline did not flush {target} intents in time");
    }
}
