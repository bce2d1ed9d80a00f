//! Queued writes

use crate::domain::{
    passes::data::{PassedNodeIds, RunSummary},
    usage::records::UsageEvent,
    users::records::UserId,
};

/// Validated publish waiting to be merged into the store.
#[derive(Debug, Clone)]
pub struct PublishIntent {
    pub user_id: UserId,
    pub passed: PassedNodeIds,
    pub summary: RunSummary,
}

/// A write waiting in the pipeline queue.
#[derive(Debug, Clone)]
pub enum Intent {
    Usage(UsageEvent),
    Publish(PublishIntent),
}

impl Intent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::Publish(_) => "publish",
        }
    }
}

impl From<UsageEvent> for Intent {
    fn from(event: UsageEvent) -> Self {
        Self::Usage(event)
    }
}

impl From<PublishIntent> for Intent {
    fn from(publish: PublishIntent) -> Self {
        Self::Publish(publish)
    }
}
