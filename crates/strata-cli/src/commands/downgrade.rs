//! Downgrade command implementation

use anyhow::Result;

use crate::cli::{DowngradeArgs, GlobalArgs};
use crate::commands::common::{build_migrator, load_config, open_database, run_migration};

/// Execute the downgrade command
pub async fn execute(args: &DowngradeArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_database(&config, global)?;
    let migrator = build_migrator(&db, &config)?;

    let current = migrator.current_version()?;
    if args.to > current {
        anyhow::bail!(
            "Target version {} is above the current version {current}; use `strata upgrade`",
            args.to
        );
    }
    run_migration(&migrator, args.to, args.dry_run)
}
