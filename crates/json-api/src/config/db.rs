//! Database Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use dryci_app::database;

/// SQLite settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "dryci.db")]
    pub database_path: PathBuf,

    /// Maximum pooled reader connections
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = database::DEFAULT_POOL_SIZE)]
    pub database_pool_size: u32,

    /// How long a statement waits on a locked database, in milliseconds
    #[arg(long, env = "DATABASE_BUSY_TIMEOUT_MS", default_value_t = 60_000_u64)]
    pub database_busy_timeout_ms: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn to_database_config(&self) -> database::DatabaseConfig {
        let mut config = database::DatabaseConfig::new(&self.database_path);

        config.pool_size = self.database_pool_size;
        config.busy_timeout = Duration::from_millis(self.database_busy_timeout_ms);

        config
    }
}
