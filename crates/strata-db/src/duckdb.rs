//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use crate::value::{Row, Value};
use duckdb::types::{ToSql, ToSqlOutput, ValueRef};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schema that holds every table strata manages
const MAIN_SCHEMA: &str = "main";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn transaction_control(&self, operation: &'static str, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError {
                operation,
                message: e.to_string(),
            })
    }
}

impl Database for DuckDbBackend {
    fn execute_ddl(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(|e| classify(e, sql))
    }

    fn execute_dml(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, duckdb::params_from_iter(params.iter()))
            .map_err(|e| classify(e, sql))
    }

    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| classify(e, sql))?;
        let mut rows = stmt
            .query(duckdb::params_from_iter(params.iter()))
            .map_err(|e| classify(e, sql))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let column_count = row.as_ref().column_count();
            let values = (0..column_count)
                .map(|i| row.get_ref(i).map_err(DbError::from).and_then(from_value_ref))
                .collect::<DbResult<Vec<_>>>()?;
            out.push(Row::new(values));
        }
        Ok(out)
    }

    fn begin(&self) -> DbResult<()> {
        self.transaction_control("BEGIN", "BEGIN TRANSACTION")
    }

    fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT", "COMMIT")
    }

    fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK", "ROLLBACK")
    }

    fn exists(&self, table: &str) -> DbResult<bool> {
        let rows = self.query(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            &[Value::from(MAIN_SCHEMA), Value::from(table)],
        )?;
        let count = rows.first().map(|r| r.int(0)).transpose()?.unwrap_or(0);
        Ok(count > 0)
    }

    fn table_columns(&self, table: &str) -> DbResult<Vec<String>> {
        let rows = self.query(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
            &[Value::from(MAIN_SCHEMA), Value::from(table)],
        )?;
        rows.iter()
            .map(|r| r.str(0).map(str::to_string))
            .collect()
    }

    fn list_tables(&self) -> DbResult<Vec<String>> {
        let rows = self.query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? AND table_type = 'BASE TABLE' ORDER BY table_name",
            &[Value::from(MAIN_SCHEMA)],
        )?;
        rows.iter()
            .map(|r| r.str(0).map(str::to_string))
            .collect()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => duckdb::types::Value::Null,
            Value::Bool(b) => duckdb::types::Value::Boolean(*b),
            Value::Int(i) => duckdb::types::Value::BigInt(*i),
            Value::Text(s) => duckdb::types::Value::Text(s.clone()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// Attach the failing statement to the error, keeping the table-not-found
/// classification from [`DbError::from`].
fn classify(err: duckdb::Error, sql: &str) -> DbError {
    match DbError::from(err) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
        other => other,
    }
}

fn from_value_ref(value: ValueRef<'_>) -> DbResult<Value> {
    let converted = match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i64::from(i)),
        ValueRef::SmallInt(i) => Value::Int(i64::from(i)),
        ValueRef::Int(i) => Value::Int(i64::from(i)),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::UTinyInt(i) => Value::Int(i64::from(i)),
        ValueRef::USmallInt(i) => Value::Int(i64::from(i)),
        ValueRef::UInt(i) => Value::Int(i64::from(i)),
        ValueRef::HugeInt(i) => Value::Int(
            i64::try_from(i).map_err(|_| DbError::ConversionError(format!("{i} overflows i64")))?,
        ),
        ValueRef::UBigInt(i) => Value::Int(
            i64::try_from(i).map_err(|_| DbError::ConversionError(format!("{i} overflows i64")))?,
        ),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| DbError::ConversionError(e.to_string()))?
                .to_string(),
        ),
        other => {
            return Err(DbError::ConversionError(format!(
                "unsupported column type {:?}",
                other.data_type()
            )))
        }
    };
    Ok(converted)
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
