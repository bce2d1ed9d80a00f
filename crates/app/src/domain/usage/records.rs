//! Usage Records

use jiff::Timestamp;

use crate::domain::users::records::UserId;

/// Operation an authorized call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKind {
    Query,
    Publish,
}

impl UsageKind {
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Query => 1,
            Self::Publish => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Publish => "publish",
        }
    }
}

/// One authorized call, appended to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageEvent {
    pub user_id: UserId,
    pub kind: UsageKind,
    pub timestamp: Timestamp,
}

impl UsageEvent {
    #[must_use]
    pub fn new(user_id: UserId, kind: UsageKind, timestamp: Timestamp) -> Self {
        Self {
            user_id,
            kind,
            timestamp,
        }
    }
}
