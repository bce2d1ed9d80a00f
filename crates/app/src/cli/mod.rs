use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dryci_app::database::{DatabaseConfig, Db};

mod db;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "dryci-app", about = "DryCI administration", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Token(token::TokenCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "dryci.db")]
    pub(crate) database_path: PathBuf,
}

impl DatabaseArgs {
    pub(crate) async fn open(&self) -> Result<Db, String> {
        Db::connect(&DatabaseConfig::new(&self.database_path))
            .await
            .map_err(|error| format!("failed to open database: {error}"))
    }

    /// Open the database and bring its schema up to date.
    pub(crate) async fn connect(&self) -> Result<Db, String> {
        let db = self.open().await?;

        db.migrate()
            .await
            .map_err(|error| format!("failed to apply migrations: {error}"))?;

        Ok(db)
    }
}

pub(crate) fn display_or(value: Option<impl ToString>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), |value| value.to_string())
}
