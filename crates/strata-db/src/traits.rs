//! Database trait definition

use crate::error::{DbError, DbResult};
use crate::value::{Row, Value};

/// Transactional database capability consumed by the migration engine.
///
/// Calls block the caller until the backend finishes. Implementations must be
/// Send + Sync so one handle can be shared, but only one transaction may be
/// open at a time.
pub trait Database: Send + Sync {
    /// Execute a DDL statement (or several, separated by `;`)
    fn execute_ddl(&self, sql: &str) -> DbResult<()>;

    /// Execute a parameterized DML statement, returns affected rows
    fn execute_dml(&self, sql: &str, params: &[Value]) -> DbResult<usize>;

    /// Run a parameterized query and collect every row
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;

    /// Open a transaction
    fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()>;

    /// Check if a table exists
    fn exists(&self, table: &str) -> DbResult<bool>;

    /// Column names of `table` in declaration order, empty if it does not exist
    fn table_columns(&self, table: &str) -> DbResult<Vec<String>>;

    /// Names of all user tables, sorted
    fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Execute `body` within a `begin` / `commit` pair, rolling back on error.
///
/// A failed commit is rolled back as well and reported through `E`.
pub fn with_transaction<T, E, F>(db: &dyn Database, body: F) -> Result<T, E>
where
    E: From<DbError>,
    F: FnOnce(&dyn Database) -> Result<T, E>,
{
    db.begin()?;

    match body(db) {
        Ok(value) => {
            if let Err(commit_err) = db.commit() {
                if let Err(rollback_err) = db.rollback() {
                    log::warn!("Rollback after failed commit also failed: {rollback_err}");
                }
                return Err(commit_err.into());
            }
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = db.rollback() {
                log::warn!("Rollback failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

/// Quote an identifier for use in generated SQL.
///
/// Several tables owned by the identity schema (`user`, `group`) collide with
/// SQL keywords, so every generated statement quotes its identifiers.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
