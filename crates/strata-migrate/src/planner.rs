//! Migration planner: resolves a target version into an ordered run of steps
//! and drives the executor through it.

use crate::context::{IdGenerator, MigrationSettings, UuidIds};
use crate::direction::{Direction, Version};
use crate::error::MigrationError;
use crate::executor::StepExecutor;
use crate::repository::{Repository, Step};
use crate::tracker::VersionTracker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use strata_db::Database;

/// One step scheduled in a direction.
#[derive(Debug, Clone, Copy)]
pub struct PlannedStep<'r> {
    step: &'r Step,
    direction: Direction,
}

impl<'r> PlannedStep<'r> {
    pub fn step(&self) -> &'r Step {
        self.step
    }

    pub fn version(&self) -> Version {
        self.step.version()
    }

    pub fn name(&self) -> &'static str {
        self.step.name()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Marker value once this step has been applied
    pub fn resulting_version(&self) -> Version {
        self.direction.resulting_version(self.step.version())
    }
}

/// Compute the steps that move a database at `current` to `target`.
///
/// Upgrades run `current+1..=target` ascending, downgrades run
/// `target+1..=current` descending. Equal versions yield an empty plan.
pub fn plan(
    repository: &Repository,
    current: Version,
    target: i64,
) -> Result<Vec<PlannedStep<'_>>, MigrationError> {
    let latest = repository.latest_version();
    let target = match Version::try_from(target) {
        Ok(t) if t <= latest => t,
        _ => {
            return Err(MigrationError::InvalidTarget {
                target,
                latest,
                current,
            })
        }
    };
    if current > latest {
        return Err(MigrationError::DatabaseAhead { current, latest });
    }

    let steps = repository.steps();
    let (lo, hi) = (current as usize, target as usize);
    let planned = if target > current {
        steps[lo..hi]
            .iter()
            .map(|step| PlannedStep {
                step,
                direction: Direction::Upgrade,
            })
            .collect()
    } else {
        steps[hi..lo]
            .iter()
            .rev()
            .map(|step| PlannedStep {
                step,
                direction: Direction::Downgrade,
            })
            .collect()
    };
    Ok(planned)
}

/// Where a database stands relative to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    UpToDate {
        version: Version,
    },
    UpgradeAvailable {
        current: Version,
        latest: Version,
        pending: usize,
    },
    DatabaseAhead {
        current: Version,
        latest: Version,
    },
}

impl MigrationStatus {
    pub fn needs_upgrade(&self) -> bool {
        matches!(self, MigrationStatus::UpgradeAvailable { .. })
    }
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::UpToDate { version } => write!(f, "up to date at version {version}"),
            MigrationStatus::UpgradeAvailable {
                current,
                latest,
                pending,
            } => write!(
                f,
                "at version {current}, {pending} step(s) behind latest {latest}"
            ),
            MigrationStatus::DatabaseAhead { current, latest } => write!(
                f,
                "at version {current}, ahead of latest known version {latest}"
            ),
        }
    }
}

/// Moves one database between versions of one repository.
pub struct Migrator<'db> {
    db: &'db dyn Database,
    repository: Arc<Repository>,
    tracker: VersionTracker,
    settings: MigrationSettings,
    ids: Box<dyn IdGenerator>,
    abort_flag: Arc<AtomicBool>,
}

impl<'db> Migrator<'db> {
    pub fn new(
        db: &'db dyn Database,
        repository: Arc<Repository>,
        settings: MigrationSettings,
    ) -> Self {
        Self {
            db,
            repository,
            tracker: VersionTracker::new(settings.repository_id.clone()),
            settings,
            ids: Box::new(UuidIds),
            abort_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the identifier source used by steps that create rows.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    pub fn latest_version(&self) -> Version {
        self.repository.latest_version()
    }

    /// Current marker, initializing it at 0 on a blank database.
    pub fn current_version(&self) -> Result<Version, MigrationError> {
        self.tracker
            .current_version(self.db)
            .map_err(MigrationError::Tracker)
    }

    pub fn status(&self) -> Result<MigrationStatus, MigrationError> {
        let current = self.current_version()?;
        let latest = self.latest_version();
        let status = if current == latest {
            MigrationStatus::UpToDate { version: current }
        } else if current > latest {
            MigrationStatus::DatabaseAhead { current, latest }
        } else {
            MigrationStatus::UpgradeAvailable {
                current,
                latest,
                pending: (latest - current) as usize,
            }
        };
        Ok(status)
    }

    /// Steps `migrate(target)` would run, without running them.
    pub fn plan(&self, target: i64) -> Result<Vec<PlannedStep<'_>>, MigrationError> {
        let current = self.current_version()?;
        plan(&self.repository, current, target)
    }

    /// Flag checked between steps. Setting it stops the run after the step in
    /// flight commits.
    ///
    /// The flag stays raised, so every later non-empty `migrate` also aborts
    /// until [`Migrator::reset_abort`] is called.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort_flag)
    }

    /// Lower the abort flag so the next `migrate` runs.
    pub fn reset_abort(&self) {
        self.abort_flag.store(false, Ordering::SeqCst);
    }

    /// Move the database to `target`, one committed step at a time.
    ///
    /// On failure the database stays at the last committed version, reported
    /// by [`MigrationError::reached`].
    pub fn migrate(&self, target: i64) -> Result<Version, MigrationError> {
        let current = self.current_version()?;
        let planned = plan(&self.repository, current, target)?;
        if planned.is_empty() {
            log::info!("Database already at version {current}, nothing to do");
            return Ok(current);
        }

        log::info!(
            "Migrating from version {current} to {target} ({} step(s))",
            planned.len()
        );
        let started = Instant::now();
        let executor = StepExecutor::new(
            self.db,
            &self.tracker,
            self.ids.as_ref(),
            &self.settings,
        );

        let mut reached = current;
        for planned_step in &planned {
            if self.abort_flag.load(Ordering::SeqCst) {
                log::warn!("Migration aborted at version {reached}");
                return Err(MigrationError::Aborted { reached });
            }
            reached = executor
                .apply(planned_step.step(), planned_step.direction())
                .map_err(|source| {
                    log::error!("Migration stopped at version {reached}: {source}");
                    MigrationError::Step { reached, source }
                })?;
        }

        log::info!(
            "Reached version {reached} in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        Ok(reached)
    }

    pub fn upgrade_to_latest(&self) -> Result<Version, MigrationError> {
        self.migrate(i64::from(self.latest_version()))
    }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
