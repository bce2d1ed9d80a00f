use clap::Args;
use dryci_app::domain::users::{SqliteUsersService, UsersService};

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let db = args.database.connect().await?;

    let user = SqliteUsersService::new(db.clone())
        .create_user()
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_id: {}", user.id);
    println!("created_at: {}", user.created_at);

    db.close().await;

    Ok(())
}
