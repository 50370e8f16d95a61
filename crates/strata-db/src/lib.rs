//! strata-db - Database capability layer for strata
//!
//! This crate provides the [`Database`] trait the migration engine consumes
//! and a DuckDB implementation of it.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{quote_ident, with_transaction, Database};
pub use value::{Row, Value};
