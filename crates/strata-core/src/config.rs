//! Configuration types and parsing for strata.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides the configured database path.
pub const DATABASE_ENV_VAR: &str = "STRATA_DATABASE";

/// Main configuration from strata.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Identity defaults consumed by data-rewriting steps
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Migration bookkeeping settings
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Identity defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Domain id that pre-existing users and projects are assigned to when
    /// domain scoping is introduced.
    #[serde(default = "default_domain_id")]
    pub default_domain_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_domain_id: default_domain_id(),
        }
    }
}

/// Migration bookkeeping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Identifier stored next to the version marker
    #[serde(default = "default_repository_id")]
    pub repository_id: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            repository_id: default_repository_id(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

const DEFAULT_DOMAIN_ID: &str = "default";

const DEFAULT_REPOSITORY_ID: &str = "identity";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_domain_id() -> String {
    DEFAULT_DOMAIN_ID.to_string()
}

fn default_repository_id() -> String {
    DEFAULT_REPOSITORY_ID.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for strata.yml or strata.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("strata.yml");
        let yaml_path = dir.join("strata.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but falls back to the
    /// defaults when the directory holds no config file.
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::load_from_dir(dir) {
            Err(CoreError::ConfigNotFound { path }) => {
                log::debug!("No config at {path}, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.identity.default_domain_id.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "identity.default_domain_id cannot be empty".to_string(),
            });
        }

        if self.migration.repository_id.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration.repository_id cannot be empty".to_string(),
            });
        }

        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty (use \":memory:\" for in-memory)"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the database path from CLI flag, STRATA_DATABASE or config
    ///
    /// Priority: CLI flag > STRATA_DATABASE env var > config value
    pub fn resolve_database_path(&self, cli_path: Option<&str>) -> String {
        cli_path
            .map(String::from)
            .or_else(|| std::env::var(DATABASE_ENV_VAR).ok())
            .unwrap_or_else(|| self.database.path.clone())
    }

    /// Returns true if the configured database lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.database.path == DEFAULT_DB_PATH
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
