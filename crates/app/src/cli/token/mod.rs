use clap::{Args, Subcommand};

mod create;
mod disable;
mod list;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Issue a token; it is printed once
    Create(create::CreateTokenArgs),
    /// List a user's tokens
    List(list::ListTokensArgs),
    /// Stop a token from authenticating
    Disable(disable::DisableTokenArgs),
}

pub(crate) async fn run(command: TokenCommand) -> Result<(), String> {
    match command.command {
        TokenSubcommand::Create(args) => create::run(args).await,
        TokenSubcommand::List(args) => list::run(args).await,
        TokenSubcommand::Disable(args) => disable::run(args).await,
    }
}
