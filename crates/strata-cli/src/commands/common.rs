//! Shared utilities for command implementations

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strata_core::Config;
use strata_db::DuckDbBackend;
use strata_migrate::{MigrationError, MigrationSettings, Migrator, PlannedStep, Repository};

use crate::cli::GlobalArgs;

/// Load configuration from `--config`, or from the project directory.
///
/// A project directory without a config file falls back to the defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(Path::new(path)).context("Failed to load config"),
        None => Config::load_from_dir_or_default(Path::new(&global.project_dir))
            .context("Failed to load config"),
    }
}

/// Open the database named by `--database`, STRATA_DATABASE or the config.
pub(crate) fn open_database(config: &Config, global: &GlobalArgs) -> Result<DuckDbBackend> {
    let path = config.resolve_database_path(global.database.as_deref());
    if path == ":memory:" {
        log::warn!("Using an in-memory database; changes are discarded on exit");
    }
    log::debug!("Opening database at {path}");
    DuckDbBackend::new(&path).with_context(|| format!("Failed to open database '{path}'"))
}

pub(crate) fn migration_settings(config: &Config) -> MigrationSettings {
    MigrationSettings {
        default_domain_id: config.identity.default_domain_id.clone(),
        repository_id: config.migration.repository_id.clone(),
    }
}

/// Build a migrator over the built-in repository.
pub(crate) fn build_migrator<'db>(
    db: &'db DuckDbBackend,
    config: &Config,
) -> Result<Migrator<'db>> {
    let repository = Repository::builtin().context("Built-in change repository is invalid")?;
    Ok(Migrator::new(
        db,
        Arc::new(repository),
        migration_settings(config),
    ))
}

/// Raise `flag` on Ctrl-C so a running migration stops after its current step.
pub(crate) fn abort_on_ctrl_c(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        log::warn!("Interrupted; stopping after the current step");
        flag.store(true, Ordering::SeqCst);
    });
}

/// Run a migration to `target`, or print its plan when `dry_run` is set.
pub(crate) fn run_migration(migrator: &Migrator<'_>, target: u32, dry_run: bool) -> Result<()> {
    let current = migrator.current_version()?;

    if dry_run {
        let planned = migrator.plan(i64::from(target))?;
        if planned.is_empty() {
            println!("Already at version {current}, nothing to do");
        } else {
            println!("Would move from version {current} to {target}:");
            print_plan(&planned);
        }
        return Ok(());
    }

    abort_on_ctrl_c(migrator.abort_handle());
    match migrator.migrate(i64::from(target)) {
        Ok(reached) if reached == current => {
            println!("Already at version {current}, nothing to do");
            Ok(())
        }
        Ok(reached) => {
            println!("Migrated from version {current} to {reached}");
            Ok(())
        }
        Err(e) => Err(report_failure(e)),
    }
}

fn report_failure(err: MigrationError) -> anyhow::Error {
    if let Some(reached) = err.reached() {
        eprintln!("Database left at version {reached}");
    }
    anyhow::Error::new(err).context("Migration failed")
}

pub(crate) fn print_plan(planned: &[PlannedStep<'_>]) {
    let rows: Vec<Vec<String>> = planned
        .iter()
        .map(|p| {
            vec![
                format!("{:03}", p.version()),
                p.name().to_string(),
                p.direction().to_string(),
                p.resulting_version().to_string(),
            ]
        })
        .collect();
    print_table(&["VERSION", "NAME", "DIRECTION", "RESULT"], &rows);
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
