use clap::Args;
use dryci_app::auth::{AuthService, AuthServiceError, SqliteAuthService};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct DisableTokenArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Full token to disable
    #[arg(long, env = "DRYCI_TOKEN", hide_env_values = true)]
    token: String,
}

pub(crate) async fn run(args: DisableTokenArgs) -> Result<(), String> {
    let db = args.database.connect().await?;

    let result = SqliteAuthService::new(db.clone())
        .disable_api_token(&args.token)
        .await;

    match result {
        Ok(()) => println!("token disabled"),
        Err(AuthServiceError::NotFound) => println!("token was not active"),
        Err(error) => return Err(format!("failed to disable token: {error}")),
    }

    db.close().await;

    Ok(())
}
