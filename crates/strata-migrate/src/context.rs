//! Capabilities handed to transformation bodies.

use crate::error::TransformError;
use strata_db::{quote_ident, Database, Row, Value};

/// Source of fresh row identifiers for steps that create rows.
///
/// Identifiers must be unique; they need not be deterministic.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs rendered as 32 lowercase hex characters
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Constants steps need from the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    /// Domain that owns every user and project created before domains existed
    pub default_domain_id: String,
    /// Key of the version marker row
    pub repository_id: String,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            default_domain_id: "default".to_string(),
            repository_id: "identity".to_string(),
        }
    }
}

/// Everything a transformation body may touch.
pub struct StepContext<'a> {
    db: &'a dyn Database,
    ids: &'a dyn IdGenerator,
    settings: &'a MigrationSettings,
}

impl<'a> StepContext<'a> {
    pub fn new(
        db: &'a dyn Database,
        ids: &'a dyn IdGenerator,
        settings: &'a MigrationSettings,
    ) -> Self {
        Self { db, ids, settings }
    }

    pub fn db(&self) -> &dyn Database {
        self.db
    }

    pub fn settings(&self) -> &MigrationSettings {
        self.settings
    }

    pub fn new_id(&self) -> String {
        self.ids.next_id()
    }

    pub fn ddl(&self, sql: &str) -> Result<(), TransformError> {
        Ok(self.db.execute_ddl(sql)?)
    }

    pub fn dml(&self, sql: &str, params: &[Value]) -> Result<usize, TransformError> {
        Ok(self.db.execute_dml(sql, params)?)
    }

    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, TransformError> {
        Ok(self.db.query(sql, params)?)
    }

    /// `CREATE TABLE name (columns)`
    pub fn create_table(&self, name: &str, columns: &str) -> Result<(), TransformError> {
        self.ddl(&format!("CREATE TABLE {} ({columns})", quote_ident(name)))
    }

    pub fn drop_table(&self, name: &str) -> Result<(), TransformError> {
        self.ddl(&format!("DROP TABLE {}", quote_ident(name)))
    }

    pub fn rename_table(&self, from: &str, to: &str) -> Result<(), TransformError> {
        self.ddl(&format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(from),
            quote_ident(to)
        ))
    }

    /// `definition` is everything after the column name, e.g. `BOOLEAN DEFAULT TRUE`
    pub fn add_column(
        &self,
        table: &str,
        column: &str,
        definition: &str,
    ) -> Result<(), TransformError> {
        self.ddl(&format!(
            "ALTER TABLE {} ADD COLUMN {} {definition}",
            quote_ident(table),
            quote_ident(column)
        ))
    }

    pub fn drop_column(&self, table: &str, column: &str) -> Result<(), TransformError> {
        self.ddl(&format!(
            "ALTER TABLE {} DROP COLUMN {}",
            quote_ident(table),
            quote_ident(column)
        ))
    }

    pub fn rename_column(&self, table: &str, from: &str, to: &str) -> Result<(), TransformError> {
        self.ddl(&format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            quote_ident(table),
            quote_ident(from),
            quote_ident(to)
        ))
    }
}
