//! Pipeline errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue stayed full for the whole enqueue timeout.
    #[error("service overloaded")]
    Overloaded,

    /// The worker has stopped accepting intents.
    #[error("pipeline is shut down")]
    Closed,
}
