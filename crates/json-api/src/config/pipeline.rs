//! Pipeline Config

use std::time::Duration;

use clap::Args;
use dryci_app::pipeline::{DEFAULT_QUEUE_CAPACITY, PipelineConfig};

/// Write pipeline settings.
#[derive(Debug, Args)]
pub struct PipelineSettings {
    /// Quiet period before queued writes are flushed, in milliseconds
    #[arg(long, env = "PIPELINE_FLUSH_INTERVAL_MS", default_value_t = 100_u64)]
    pub pipeline_flush_interval_ms: u64,

    /// Queued writes allowed before callers are pushed back
    #[arg(long, env = "PIPELINE_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub pipeline_queue_capacity: usize,

    /// How long a request waits for queue space, in milliseconds
    #[arg(long, env = "PIPELINE_ENQUEUE_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub pipeline_enqueue_timeout_ms: u64,
}

impl PipelineSettings {
    #[must_use]
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            flush_interval: Duration::from_millis(self.pipeline_flush_interval_ms),
            queue_capacity: self.pipeline_queue_capacity,
            enqueue_timeout: Duration::from_millis(self.pipeline_enqueue_timeout_ms),
        }
    }
}
