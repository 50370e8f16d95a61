//! Version command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_migrator, load_config, open_database};

/// Print the recorded schema version
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_database(&config, global)?;
    let migrator = build_migrator(&db, &config)?;

    println!("{}", migrator.current_version()?);
    Ok(())
}
