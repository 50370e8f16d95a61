//! Step executor: one step, one transaction.

use crate::context::{IdGenerator, MigrationSettings, StepContext};
use crate::direction::{Direction, Version};
use crate::error::StepError;
use crate::repository::Step;
use crate::tracker::VersionTracker;
use std::time::Instant;
use strata_db::Database;

/// Applies single steps against one database.
///
/// The transformation body and the version marker update share a transaction:
/// either both land or neither does.
pub struct StepExecutor<'a> {
    db: &'a dyn Database,
    tracker: &'a VersionTracker,
    ids: &'a dyn IdGenerator,
    settings: &'a MigrationSettings,
}

impl<'a> StepExecutor<'a> {
    pub fn new(
        db: &'a dyn Database,
        tracker: &'a VersionTracker,
        ids: &'a dyn IdGenerator,
        settings: &'a MigrationSettings,
    ) -> Self {
        Self {
            db,
            tracker,
            ids,
            settings,
        }
    }

    /// Run `step` in `direction` and return the version the marker now holds.
    pub fn apply(&self, step: &Step, direction: Direction) -> Result<Version, StepError> {
        let target = direction.resulting_version(step.version());
        log::info!(
            "Running {direction} of v{:03} '{}' (-> v{target})",
            step.version(),
            step.name()
        );
        let started = Instant::now();

        self.db
            .begin()
            .map_err(|source| StepError::Transaction {
                version: step.version(),
                direction,
                source,
            })?;

        if let Err(e) = self.run_in_transaction(step, direction, target) {
            log::warn!("Rolling back v{:03}: {e}", step.version());
            self.rollback();
            return Err(e);
        }

        if let Err(source) = self.db.commit() {
            self.rollback();
            return Err(StepError::Transaction {
                version: step.version(),
                direction,
                source,
            });
        }

        log::info!(
            "Finished {direction} of v{:03} in {:.2}s",
            step.version(),
            started.elapsed().as_secs_f64()
        );
        Ok(target)
    }

    fn run_in_transaction(
        &self,
        step: &Step,
        direction: Direction,
        target: Version,
    ) -> Result<(), StepError> {
        let ctx = StepContext::new(self.db, self.ids, self.settings);
        (step.body(direction))(&ctx).map_err(|source| StepError::Transformation {
            version: step.version(),
            name: step.name(),
            direction,
            source,
        })?;

        self.tracker
            .set_version(self.db, target)
            .map_err(|source| StepError::VersionPersist {
                version: step.version(),
                direction,
                target,
                source,
            })
    }

    fn rollback(&self) {
        if let Err(e) = self.db.rollback() {
            log::warn!("Rollback failed: {e}");
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
