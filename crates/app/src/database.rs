//! Database connection management

use std::{path::PathBuf, time::Duration};

use sqlx::{
    Connection, Sqlite, SqliteConnection, SqlitePool, Transaction,
    migrate::{MigrateError, Migrator},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

/// Statement used for write-exclusive transactions.
pub const BEGIN_IMMEDIATE_SQL: &str = "BEGIN IMMEDIATE";

pub const DEFAULT_POOL_SIZE: u32 = 128;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connection settings for the SQLite database file.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file; created when missing.
    pub path: PathBuf,

    /// Maximum pooled connections shared by request handlers.
    pub pool_size: u32,

    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// How long a request waits for a pooled connection.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }
}

/// Handle to the reader pool plus the options needed to open the writer.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    options: SqliteConnectOptions,
}

impl Db {
    /// Open the reader pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the database file cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = config.connect_options();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options.clone())
            .await?;

        Ok(Self { pool, options })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        MIGRATOR.run(&self.pool).await
    }

    /// Begin a deferred transaction. Concurrent readers never block each other.
    ///
    /// # Errors
    ///
    /// Returns an error when no pooled connection becomes available in time.
    pub async fn begin_read(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a write-exclusive transaction on a pooled connection.
    ///
    /// Only bootstrap and administrative commands use this; request traffic
    /// writes exclusively through the pipeline's own connection.
    ///
    /// # Errors
    ///
    /// Returns an error when the write lock cannot be taken within the busy timeout.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with(BEGIN_IMMEDIATE_SQL).await
    }

    /// Open a connection outside the pool for the pipeline writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the database file cannot be opened.
    pub async fn open_writer(&self) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnection::connect_with(&self.options).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Begin a write-exclusive transaction on a dedicated connection.
///
/// # Errors
///
/// Returns an error when the write lock cannot be taken within the busy timeout.
pub async fn begin_immediate(
    conn: &mut SqliteConnection,
) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
    conn.begin_with(BEGIN_IMMEDIATE_SQL).await
}

/// Whether the error means the database was busy or out of connections,
/// as opposed to a broken query or corrupt data.
#[must_use]
pub fn is_unavailable(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(database_error) => database_error
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}
