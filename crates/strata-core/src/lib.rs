//! strata-core - shared configuration and error types for strata
//!
//! This crate owns `strata.yml` parsing. Nothing here talks to a database;
//! the migration engine receives plain settings derived from [`Config`].

pub mod config;
pub mod error;

pub use config::{Config, DatabaseConfig, IdentityConfig, MigrationConfig};
pub use error::{CoreError, CoreResult};
