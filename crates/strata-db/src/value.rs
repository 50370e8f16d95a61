//! Backend-neutral column values and result rows.

use crate::error::{DbError, DbResult};
use std::fmt;

/// A single column value passed as a statement parameter or read back
/// from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    /// Returns true for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// One result row, in select-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw value at `idx`
    pub fn get(&self, idx: usize) -> DbResult<&Value> {
        self.values.get(idx).ok_or_else(|| {
            DbError::ConversionError(format!(
                "column index {idx} out of range for row of {} columns",
                self.values.len()
            ))
        })
    }

    /// Nullable text column
    pub fn opt_str(&self, idx: usize) -> DbResult<Option<&str>> {
        match self.get(idx)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.as_str())),
            other => Err(mismatch(idx, "text", other)),
        }
    }

    /// Non-null text column
    pub fn str(&self, idx: usize) -> DbResult<&str> {
        self.opt_str(idx)?
            .ok_or_else(|| DbError::ConversionError(format!("column {idx} is null, expected text")))
    }

    /// Nullable boolean column
    pub fn opt_bool(&self, idx: usize) -> DbResult<Option<bool>> {
        match self.get(idx)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            other => Err(mismatch(idx, "boolean", other)),
        }
    }

    /// Non-null integer column
    pub fn int(&self, idx: usize) -> DbResult<i64> {
        match self.get(idx)? {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch(idx, "integer", other)),
        }
    }
}

fn mismatch(idx: usize, expected: &str, found: &Value) -> DbError {
    DbError::ConversionError(format!(
        "column {idx}: expected {expected}, found {found:?}"
    ))
}
