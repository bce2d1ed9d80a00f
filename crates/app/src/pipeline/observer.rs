//! Pipeline instrumentation hooks

use std::{fmt::Debug, time::Duration};

/// How a flush ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Committed,
    RolledBack,
}

impl FlushOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Receives pipeline events, e.g. to export them as metrics.
pub trait PipelineObserver: Send + Sync + Debug {
    fn intents_enqueued(&self, _count: usize) {}

    fn flush_completed(&self, _outcome: FlushOutcome, _intents: usize, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
