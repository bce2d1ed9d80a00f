use clap::Args;
use dryci_app::{
    auth::{AuthService, SqliteAuthService},
    domain::users::records::UserId,
};

use crate::cli::{DatabaseArgs, display_or};

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User whose tokens should be listed
    #[arg(long)]
    user_id: i64,
}

pub(crate) async fn run(args: ListTokensArgs) -> Result<(), String> {
    let db = args.database.connect().await?;
    let user = UserId::from_i64(args.user_id);

    let tokens = SqliteAuthService::new(db.clone())
        .list_api_tokens(user)
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    if tokens.is_empty() {
        println!("no tokens found for user {user}");
    }

    for token in tokens {
        println!("token: {}...", token.token_prefix);
        println!("created_at: {}", token.created_at);
        println!("expires_at: {}", display_or(token.expires_at, "never"));
        println!("disabled_at: {}", display_or(token.disabled_at, "active"));
        println!();
    }

    db.close().await;

    Ok(())
}
