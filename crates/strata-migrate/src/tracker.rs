//! Version tracker: the persisted version marker.
//!
//! The marker lives in a single row of [`VERSION_TABLE`], keyed by the
//! repository id. It is created at version 0 on first use and only ever
//! rewritten by [`VersionTracker::set_version`], which callers run inside the
//! same transaction as the step it finalizes.

use crate::direction::Version;
use strata_db::{quote_ident, with_transaction, Database, DbError, DbResult, Value};

/// Table holding the version marker
pub const VERSION_TABLE: &str = "migrate_version";

/// Reads and writes the version marker for one repository
#[derive(Debug, Clone)]
pub struct VersionTracker {
    repository_id: String,
}

impl VersionTracker {
    pub fn new(repository_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    /// Read the marker, creating it at version 0 if it does not exist yet.
    pub fn current_version(&self, db: &dyn Database) -> DbResult<Version> {
        if let Some(version) = self.read(db)? {
            return Ok(version);
        }

        log::debug!(
            "No version marker for '{}', initializing at 0",
            self.repository_id
        );
        with_transaction::<_, DbError, _>(db, |tx| {
            self.ensure_table(tx)?;
            // Another caller may have raced us to it between the read and here
            if self.read(tx)?.is_none() {
                tx.execute_dml(
                    &format!(
                        "INSERT INTO {} (repository_id, version) VALUES (?, 0)",
                        quote_ident(VERSION_TABLE)
                    ),
                    &[Value::from(&self.repository_id)],
                )?;
            }
            Ok(())
        })?;

        self.read(db)?.ok_or_else(|| {
            DbError::ExecutionError(format!(
                "version marker for '{}' missing after initialization",
                self.repository_id
            ))
        })
    }

    /// Persist `version` as the current marker.
    ///
    /// Must run inside the transaction of the step being recorded.
    pub fn set_version(&self, db: &dyn Database, version: Version) -> DbResult<()> {
        let updated = db.execute_dml(
            &format!(
                "UPDATE {} SET version = ? WHERE repository_id = ?",
                quote_ident(VERSION_TABLE)
            ),
            &[Value::from(version), Value::from(&self.repository_id)],
        )?;
        if updated != 1 {
            return Err(DbError::ExecutionError(format!(
                "expected one version marker row for '{}', updated {updated}",
                self.repository_id
            )));
        }
        Ok(())
    }

    /// Remove the marker table entirely.
    pub fn drop_marker(&self, db: &dyn Database) -> DbResult<()> {
        db.execute_ddl(&format!(
            "DROP TABLE IF EXISTS {}",
            quote_ident(VERSION_TABLE)
        ))
    }

    fn ensure_table(&self, db: &dyn Database) -> DbResult<()> {
        db.execute_ddl(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 repository_id VARCHAR NOT NULL,
                 version       INTEGER NOT NULL
             )",
            quote_ident(VERSION_TABLE)
        ))
    }

    fn read(&self, db: &dyn Database) -> DbResult<Option<Version>> {
        if !db.exists(VERSION_TABLE)? {
            return Ok(None);
        }
        let rows = db.query(
            &format!(
                "SELECT version FROM {} WHERE repository_id = ?",
                quote_ident(VERSION_TABLE)
            ),
            &[Value::from(&self.repository_id)],
        )?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => {
                let raw = row.int(0)?;
                Version::try_from(raw).map(Some).map_err(|_| {
                    DbError::ConversionError(format!("invalid stored version {raw}"))
                })
            }
            _ => Err(DbError::ExecutionError(format!(
                "{} rows in {VERSION_TABLE} for '{}'",
                rows.len(),
                self.repository_id
            ))),
        }
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
