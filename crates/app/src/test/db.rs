//! Database test utilities

use tempfile::TempDir;

use crate::database::{DatabaseConfig, Db};

use super::TestSetupError;

/// Migrated SQLite database in its own temporary directory.
///
/// Every test gets a fresh file; the directory is removed on drop.
#[derive(Debug)]
pub(crate) struct TestDb {
    pub db: Db,

    _dir: TempDir,
}

impl TestDb {
    pub(crate) async fn new() -> Result<Self, TestSetupError> {
        let dir = tempfile::tempdir()?;
        let mut config = DatabaseConfig::new(dir.path().join("dryci-test.db"));

        config.pool_size = 8;

        let db = Db::connect(&config).await?;

        db.migrate().await?;

        Ok(Self { db, _dir: dir })
    }
}
