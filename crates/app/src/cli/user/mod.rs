use clap::{Args, Subcommand};
use dryci_app::domain::users::{SqliteUsersService, UsersService, records::UserId};

use crate::cli::DatabaseArgs;

mod create;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create a new user
    Create(create::CreateUserArgs),
    /// Reject every token of a user
    Disable(UserIdArgs),
    /// Accept a disabled user's tokens again
    Enable(UserIdArgs),
}

#[derive(Debug, Args)]
pub(crate) struct UserIdArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// User id
    #[arg(long)]
    user_id: i64,
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::Create(args) => create::run(args).await,
        UserSubcommand::Disable(args) => set_enabled(args, false).await,
        UserSubcommand::Enable(args) => set_enabled(args, true).await,
    }
}

async fn set_enabled(args: UserIdArgs, enabled: bool) -> Result<(), String> {
    let db = args.database.connect().await?;
    let service = SqliteUsersService::new(db.clone());
    let user = UserId::from_i64(args.user_id);

    let result = if enabled {
        service.enable_user(user).await
    } else {
        service.disable_user(user).await
    };

    result.map_err(|error| format!("failed to update user {user}: {error}"))?;

    println!(
        "user {user} {}",
        if enabled { "enabled" } else { "disabled" }
    );

    db.close().await;

    Ok(())
}
