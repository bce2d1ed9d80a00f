//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    pipeline::PipelineSettings,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod pipeline;
pub(crate) mod server;

/// dryci JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "dryci-json", about = "dryci shared test-pass cache server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// SQLite database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Write pipeline settings.
    #[command(flatten)]
    pub pipeline: PipelineSettings,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // A missing .env file is fine.
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_match_documented_values() -> TestResult {
        let config = ServerConfig::try_parse_from(["dryci-json"])?;

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.database_pool_size, 128);

        let pipeline = config.pipeline.to_pipeline_config();

        assert_eq!(pipeline.flush_interval, Duration::from_millis(100));
        assert_eq!(pipeline.queue_capacity, 16_384);
        assert_eq!(pipeline.enqueue_timeout, Duration::from_secs(2));

        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "dryci-json",
            "--port",
            "9000",
            "--database-path",
            "/tmp/passes.db",
            "--pipeline-flush-interval-ms",
            "5",
        ])?;

        assert_eq!(config.socket_addr(), format!("{}:9000", config.server.host));
        assert_eq!(
            config.database.to_database_config().path.to_str(),
            Some("/tmp/passes.db")
        );
        assert_eq!(
            config.pipeline.to_pipeline_config().flush_interval,
            Duration::from_millis(5)
        );

        Ok(())
    }
}
