//! Error types for the migration engine.

use crate::direction::{Direction, Version};
use strata_db::DbError;
use thiserror::Error;

/// The change repository is malformed. Fatal at load time.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Two definitions claim the same version (R001)
    #[error("[R001] Duplicate step for version {version}: '{first}' and '{second}'")]
    Duplicate {
        version: Version,
        first: &'static str,
        second: &'static str,
    },

    /// Versions are not contiguous from 1 (R002)
    #[error("[R002] Version gap: expected {expected}, found {found} ('{name}')")]
    Gap {
        expected: Version,
        found: Version,
        name: &'static str,
    },

    /// A definition lacks one of its bodies (R003)
    #[error("[R003] Step {version} ('{name}') has no {direction} body")]
    MissingBody {
        version: Version,
        name: &'static str,
        direction: Direction,
    },
}

/// Failure inside a transformation body.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Statement failed (T001)
    #[error("[T001] {0}")]
    Database(#[from] DbError),

    /// A stored value could not be decoded into the shape the step expects (T002)
    #[error("[T002] Malformed {column} on {table} row '{id}': {message}")]
    MalformedRow {
        table: &'static str,
        column: &'static str,
        id: String,
        message: String,
    },

    /// Rows that must merge into one disagree (T003)
    #[error("[T003] Cannot coalesce {table} rows for '{key}': {reason}")]
    Conflict {
        table: &'static str,
        key: String,
        reason: String,
    },
}

/// Result type alias for transformation bodies
pub type TransformResult = Result<(), TransformError>;

/// One step failed and was rolled back.
#[derive(Error, Debug)]
pub enum StepError {
    /// The transformation body failed (S001)
    #[error("[S001] {direction} of version {version} ('{name}') failed: {source}")]
    Transformation {
        version: Version,
        name: &'static str,
        direction: Direction,
        #[source]
        source: TransformError,
    },

    /// The version marker could not be written (S002)
    #[error("[S002] Recording version {target} after {direction} of version {version} failed: {source}")]
    VersionPersist {
        version: Version,
        direction: Direction,
        target: Version,
        #[source]
        source: DbError,
    },

    /// BEGIN or COMMIT around the step failed (S003)
    #[error("[S003] Transaction for {direction} of version {version} failed: {source}")]
    Transaction {
        version: Version,
        direction: Direction,
        #[source]
        source: DbError,
    },
}

impl StepError {
    /// Version of the step that failed
    pub fn version(&self) -> Version {
        match self {
            StepError::Transformation { version, .. }
            | StepError::VersionPersist { version, .. }
            | StepError::Transaction { version, .. } => *version,
        }
    }

    /// Direction the failed step was running in
    pub fn direction(&self) -> Direction {
        match self {
            StepError::Transformation { direction, .. }
            | StepError::VersionPersist { direction, .. }
            | StepError::Transaction { direction, .. } => *direction,
        }
    }
}

/// Errors surfaced by [`crate::Migrator`].
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Repository failed validation (M001)
    #[error("[M001] {0}")]
    Repository(#[from] RepositoryError),

    /// Requested target is outside `0..=latest` (M002)
    #[error("[M002] Invalid target version {target}: must be within 0..={latest}")]
    InvalidTarget {
        target: i64,
        latest: Version,
        current: Version,
    },

    /// The marker is newer than anything the repository knows (M003)
    #[error("[M003] Database is at version {current}, newer than the latest known version {latest}")]
    DatabaseAhead { current: Version, latest: Version },

    /// A step failed; earlier steps of the run stay applied (M004)
    #[error("[M004] Migration stopped at version {reached}: {source}")]
    Step {
        reached: Version,
        #[source]
        source: StepError,
    },

    /// The abort flag was raised between steps (M005)
    #[error("[M005] Migration aborted at version {reached}")]
    Aborted { reached: Version },

    /// Reading or bootstrapping the version marker failed (M006)
    #[error("[M006] Version marker unavailable: {0}")]
    Tracker(#[source] DbError),
}

impl MigrationError {
    /// Version the database is at after this error, when known.
    pub fn reached(&self) -> Option<Version> {
        match self {
            MigrationError::InvalidTarget { current, .. } => Some(*current),
            MigrationError::DatabaseAhead { current, .. } => Some(*current),
            MigrationError::Step { reached, .. } | MigrationError::Aborted { reached } => {
                Some(*reached)
            }
            MigrationError::Repository(_) | MigrationError::Tracker(_) => None,
        }
    }

    /// The step failure behind this error, if any
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            MigrationError::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}
