//! Check command implementation

use anyhow::Result;
use strata_migrate::shape::compare;
use strata_migrate::VERSION_TABLE;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{build_migrator, load_config, open_database};

/// Compare live tables and columns with those expected at a version
pub async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_database(&config, global)?;
    let migrator = build_migrator(&db, &config)?;

    let version = match args.version {
        Some(v) => v,
        None => migrator.current_version()?,
    };
    let expected = migrator.repository().expected_schema(version);
    let mismatches = compare(&db, &expected, &[VERSION_TABLE])?;

    if mismatches.is_empty() {
        println!(
            "Schema matches version {version} ({} table(s))",
            expected.len()
        );
        return Ok(());
    }

    for mismatch in &mismatches {
        eprintln!("  {mismatch}");
    }
    anyhow::bail!(
        "{} difference(s) from the schema expected at version {version}",
        mismatches.len()
    )
}
