//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Strata - move an identity database between schema versions
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding strata.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (DuckDB file or :memory:)
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the database's current schema version
    Version,

    /// Compare the database version with the latest known version
    Status,

    /// Upgrade to the latest version, or to --to
    Upgrade(UpgradeArgs),

    /// Downgrade to --to
    Downgrade(DowngradeArgs),

    /// Verify live tables and columns against the expected schema
    Check(CheckArgs),
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Target version (default: latest)
    #[arg(long)]
    pub to: Option<u32>,

    /// Print the steps that would run without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the downgrade command
#[derive(Args, Debug)]
pub struct DowngradeArgs {
    /// Target version
    #[arg(long)]
    pub to: u32,

    /// Print the steps that would run without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Version to check against (default: the recorded version)
    #[arg(long)]
    pub version: Option<u32>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
