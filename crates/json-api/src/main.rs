//! dryci JSON API Server

use std::{process::ExitCode, sync::Arc};

use salvo::prelude::*;
use tracing::{error, info, warn};

use dryci_app::context::AppContext;

use crate::{
    config::ServerConfig,
    observability::{Observability, PrometheusPipelineObserver},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod passes;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// dryci JSON API Server entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(config_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("{config_error}");
            }

            return if config_error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging failed to initialize, must use eprintln"
            )]
            {
                eprintln!("failed to initialize observability: {init_error}");
            }

            return ExitCode::FAILURE;
        }
    };

    let code = serve(&config).await;

    observability.shutdown();

    code
}

async fn serve(config: &ServerConfig) -> ExitCode {
    let mut context = match AppContext::initialise(
        &config.database.to_database_config(),
        config.pipeline.to_pipeline_config(),
        Arc::new(PrometheusPipelineObserver),
    )
    .await
    {
        Ok(context) => context,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            return ExitCode::FAILURE;
        }
    };

    if let Some(issued) = context.issued_superuser_token.take() {
        warn!(
            user_id = %issued.metadata.user_id,
            token = %issued.token,
            "minted the superuser api token; store it now, it is not shown again"
        );
    }

    let addr = config.socket_addr();

    let listener = match TcpListener::new(addr.clone()).try_bind().await {
        Ok(listener) => listener,
        Err(bind_error) => {
            error!("failed to bind {addr}: {bind_error}");

            context.shutdown().await;

            return ExitCode::FAILURE;
        }
    };

    info!("listening on {addr}");

    let server = Server::new(listener);
    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(signal_error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {signal_error}");
        }
    });

    server
        .serve(router::service_router(State::shared(Arc::clone(
            &context.passes,
        ))))
        .await;

    info!("server stopped, flushing queued writes");

    context.shutdown().await;

    ExitCode::SUCCESS
}
