//! Test Context and Helpers

mod context;
mod db;

use thiserror::Error;

pub(crate) use context::TestContext;
pub(crate) use db::TestDb;

use crate::{auth::AuthServiceError, domain::users::UsersServiceError};

#[derive(Debug, Error)]
pub(crate) enum TestSetupError {
    #[error("temporary directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("database: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("users: {0}")]
    Users(#[from] UsersServiceError),

    #[error("auth: {0}")]
    Auth(#[from] AuthServiceError),
}
