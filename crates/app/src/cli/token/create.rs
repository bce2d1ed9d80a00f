use std::time::Duration;

use clap::Args;
use dryci_app::{
    auth::{AuthService, SqliteAuthService},
    domain::users::records::UserId,
};

use crate::cli::{DatabaseArgs, display_or};

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User that should own the token
    #[arg(long)]
    user_id: i64,

    /// Token lifetime in seconds; 0 never expires
    #[arg(long, default_value_t = 0)]
    ttl_seconds: u64,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let db = args.database.connect().await?;
    let service = SqliteAuthService::new(db.clone());

    let ttl = (args.ttl_seconds > 0).then(|| Duration::from_secs(args.ttl_seconds));

    let issued = service
        .issue_api_token(UserId::from_i64(args.user_id), ttl)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("user_id: {}", issued.metadata.user_id);
    println!("token_created_at: {}", issued.metadata.created_at);
    println!(
        "token_expires_at: {}",
        display_or(issued.metadata.expires_at, "never")
    );
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    db.close().await;

    Ok(())
}
