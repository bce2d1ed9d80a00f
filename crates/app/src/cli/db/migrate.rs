use clap::Args;
use dryci_app::bootstrap;

use crate::cli::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct MigrateArgs {
    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: MigrateArgs) -> Result<(), String> {
    let db = args.database.open().await?;

    let issued = bootstrap::initialise(&db)
        .await
        .map_err(|error| format!("failed to initialise database: {error}"))?;

    println!("database ready: {}", args.database.database_path.display());

    if let Some(issued) = issued {
        println!("superuser_id: {}", issued.metadata.user_id);
        println!("api_token: {}", issued.token);
        println!("store this token now; it is only shown once");
    }

    db.close().await;

    Ok(())
}
