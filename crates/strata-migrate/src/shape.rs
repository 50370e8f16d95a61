//! Declared table shapes.
//!
//! Every step states which tables it creates or reshapes and which it
//! removes. Folding those declarations over versions `1..=v` gives the schema
//! the database should have at `v`; [`compare`] checks a live database
//! against it.

use std::collections::BTreeMap;
use std::fmt;
use strata_db::{Database, DbResult};

/// Column layout of one table, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// Tables a step leaves behind after its upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepShape {
    /// Tables created or reshaped, with their full column list afterwards
    pub tables: &'static [TableShape],
    /// Tables that no longer exist afterwards
    pub removed: &'static [&'static str],
}

impl StepShape {
    pub const UNCHANGED: StepShape = StepShape {
        tables: &[],
        removed: &[],
    };

    /// Apply this step's declarations on top of `schema`
    pub fn apply_to(&self, schema: &mut BTreeMap<&'static str, &'static [&'static str]>) {
        for table in self.removed {
            schema.remove(table);
        }
        for shape in self.tables {
            schema.insert(shape.table, shape.columns);
        }
    }
}

/// A difference between the expected and the live schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    MissingTable(String),
    UnexpectedTable(String),
    Columns {
        table: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMismatch::MissingTable(t) => write!(f, "table '{t}' is missing"),
            ShapeMismatch::UnexpectedTable(t) => write!(f, "table '{t}' should not exist"),
            ShapeMismatch::Columns {
                table,
                expected,
                actual,
            } => write!(
                f,
                "table '{table}' has columns [{}], expected [{}]",
                actual.join(", "),
                expected.join(", ")
            ),
        }
    }
}

/// Compare `expected` against the live database.
///
/// Tables named in `ignore` (the version marker table) are skipped.
pub fn compare(
    db: &dyn Database,
    expected: &BTreeMap<&'static str, &'static [&'static str]>,
    ignore: &[&str],
) -> DbResult<Vec<ShapeMismatch>> {
    let mut mismatches = Vec::new();

    for (table, columns) in expected {
        if !db.exists(table)? {
            mismatches.push(ShapeMismatch::MissingTable(table.to_string()));
            continue;
        }
        let actual = db.table_columns(table)?;
        if actual.iter().map(String::as_str).ne(columns.iter().copied()) {
            mismatches.push(ShapeMismatch::Columns {
                table: table.to_string(),
                expected: columns.iter().map(|c| c.to_string()).collect(),
                actual,
            });
        }
    }

    for table in db.list_tables()? {
        if !expected.contains_key(table.as_str()) && !ignore.contains(&table.as_str()) {
            mismatches.push(ShapeMismatch::UnexpectedTable(table));
        }
    }

    Ok(mismatches)
}
