//! Pipeline settings

use std::time::Duration;

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_QUEUE_CAPACITY: usize = 16_384;
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Quiet period after the first queued intent before a batch is written.
    pub flush_interval: Duration,

    /// Intents that may wait in the queue before callers are pushed back.
    pub queue_capacity: usize,

    /// How long a caller waits for queue space before giving up.
    pub enqueue_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
        }
    }
}
