//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::IssuedApiToken,
    bootstrap::{self, BootstrapError},
    database::{DatabaseConfig, Db},
    domain::passes::{PassesService, SqlitePassesService},
    pipeline::{Pipeline, PipelineConfig, PipelineObserver},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to bootstrap database")]
    Bootstrap(#[from] BootstrapError),

    #[error("failed to start write pipeline")]
    Pipeline(#[source] sqlx::Error),
}

pub struct AppContext {
    pub passes: Arc<dyn PassesService>,

    /// Superuser token minted by this start, if any.
    pub issued_superuser_token: Option<IssuedApiToken>,

    db: Db,
    pipeline: Pipeline,
}

impl AppContext {
    /// Open the database, provision it and start the write pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or migrated, or
    /// the pipeline's writer connection cannot be opened.
    pub async fn initialise(
        database: &DatabaseConfig,
        pipeline: PipelineConfig,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<Self, AppInitError> {
        let db = Db::connect(database)
            .await
            .map_err(AppInitError::Database)?;

        let issued_superuser_token = bootstrap::initialise(&db).await?;

        let pipeline = Pipeline::spawn(&db, pipeline, observer)
            .await
            .map_err(AppInitError::Pipeline)?;

        Ok(Self {
            passes: Arc::new(SqlitePassesService::new(db.clone(), pipeline.handle())),
            issued_superuser_token,
            db,
            pipeline,
        })
    }

    /// Flush the pipeline and close the database.
    pub async fn shutdown(self) {
        self.pipeline.shutdown().await;
        self.db.close().await;
    }
}
