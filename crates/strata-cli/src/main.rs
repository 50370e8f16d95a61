//! Strata CLI - inspect and migrate identity schema versions

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{check, downgrade, status, upgrade, version};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Version => version::execute(&cli.global).await,
        cli::Commands::Status => status::execute(&cli.global).await,
        cli::Commands::Upgrade(args) => upgrade::execute(args, &cli.global).await,
        cli::Commands::Downgrade(args) => downgrade::execute(args, &cli.global).await,
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
