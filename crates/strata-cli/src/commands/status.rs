//! Status command implementation

use anyhow::Result;
use strata_migrate::MigrationStatus;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_migrator, load_config, open_database, print_plan};

/// Report where the database stands and list pending steps
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_database(&config, global)?;
    let migrator = build_migrator(&db, &config)?;

    let status = migrator.status()?;
    println!("Database is {status}");

    match status {
        MigrationStatus::UpgradeAvailable { latest, .. } => {
            println!();
            print_plan(&migrator.plan(i64::from(latest))?);
        }
        MigrationStatus::DatabaseAhead { .. } => {
            anyhow::bail!("Database was migrated by a newer release");
        }
        MigrationStatus::UpToDate { .. } => {}
    }
    Ok(())
}
