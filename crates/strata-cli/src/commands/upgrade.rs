//! Upgrade command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common::{build_migrator, load_config, open_database, run_migration};

/// Execute the upgrade command
pub async fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_database(&config, global)?;
    let migrator = build_migrator(&db, &config)?;

    let target = args.to.unwrap_or_else(|| migrator.latest_version());
    let current = migrator.current_version()?;
    if target < current {
        anyhow::bail!(
            "Target version {target} is below the current version {current}; use `strata downgrade`"
        );
    }
    run_migration(&migrator, target, args.dry_run)
}
