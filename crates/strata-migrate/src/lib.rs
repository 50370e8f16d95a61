//! Versioned relational-schema migration engine.
//!
//! The engine moves a database between numbered schema versions one step at a
//! time. Each step pairs an upgrade with a downgrade and runs inside a single
//! transaction together with the version marker update, so a failed step is
//! never visible.
//!
//! ```ignore
//! let db = DuckDbBackend::in_memory()?;
//! let repository = Arc::new(Repository::builtin()?);
//! let migrator = Migrator::new(&db, repository, MigrationSettings::default());
//! migrator.migrate(16)?;
//! ```

pub mod context;
pub mod direction;
pub mod error;
pub mod executor;
pub mod planner;
pub mod repository;
pub mod shape;
pub mod steps;
pub mod tracker;

pub use context::{IdGenerator, MigrationSettings, StepContext, UuidIds};
pub use direction::{Direction, Version};
pub use error::{MigrationError, RepositoryError, StepError, TransformError, TransformResult};
pub use executor::StepExecutor;
pub use planner::{plan, MigrationStatus, Migrator, PlannedStep};
pub use repository::{Repository, Step, StepDef, TransformFn};
pub use shape::{ShapeMismatch, StepShape, TableShape};
pub use tracker::{VersionTracker, VERSION_TABLE};
