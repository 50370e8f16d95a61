//! The change repository: ordered, validated step definitions.

use crate::context::StepContext;
use crate::direction::{Direction, Version};
use crate::error::{RepositoryError, TransformResult};
use crate::shape::StepShape;
use std::collections::BTreeMap;

/// Body of one direction of a step
pub type TransformFn = fn(&StepContext<'_>) -> TransformResult;

/// A step as declared, before validation.
pub struct StepDef {
    /// Sequential version number (1-based)
    pub version: Version,
    /// Short snake_case description
    pub name: &'static str,
    pub upgrade: Option<TransformFn>,
    pub downgrade: Option<TransformFn>,
    /// Tables this step creates, reshapes or removes on upgrade
    pub shape: StepShape,
}

/// A validated step with both bodies present.
#[derive(Clone, Copy)]
pub struct Step {
    version: Version,
    name: &'static str,
    upgrade: TransformFn,
    downgrade: TransformFn,
    shape: StepShape,
}

impl Step {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &StepShape {
        &self.shape
    }

    /// The body to run for `direction`
    pub fn body(&self, direction: Direction) -> TransformFn {
        match direction {
            Direction::Upgrade => self.upgrade,
            Direction::Downgrade => self.downgrade,
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered steps `1..=latest_version()`, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Repository {
    steps: Vec<Step>,
}

impl Repository {
    /// Validate `defs` and build a repository.
    ///
    /// Definitions may be given in any order; after sorting, versions must run
    /// contiguously from 1 with no duplicates, and every definition needs both
    /// bodies.
    pub fn load(defs: &[StepDef]) -> Result<Self, RepositoryError> {
        let mut sorted: Vec<&StepDef> = defs.iter().collect();
        sorted.sort_by_key(|d| d.version);

        let mut steps: Vec<Step> = Vec::with_capacity(sorted.len());
        for def in sorted {
            if let Some(prev) = steps.last() {
                if prev.version == def.version {
                    return Err(RepositoryError::Duplicate {
                        version: def.version,
                        first: prev.name,
                        second: def.name,
                    });
                }
            }

            let expected = steps.len() as Version + 1;
            if def.version != expected {
                return Err(RepositoryError::Gap {
                    expected,
                    found: def.version,
                    name: def.name,
                });
            }

            let missing = |direction| RepositoryError::MissingBody {
                version: def.version,
                name: def.name,
                direction,
            };
            let upgrade = def.upgrade.ok_or_else(|| missing(Direction::Upgrade))?;
            let downgrade = def.downgrade.ok_or_else(|| missing(Direction::Downgrade))?;

            steps.push(Step {
                version: def.version,
                name: def.name,
                upgrade,
                downgrade,
                shape: def.shape,
            });
        }

        log::debug!("Loaded change repository with {} step(s)", steps.len());
        Ok(Self { steps })
    }

    /// The identity schema history shipped with this crate
    pub fn builtin() -> Result<Self, RepositoryError> {
        Self::load(crate::steps::STEPS)
    }

    /// Highest known version, 0 for an empty repository
    pub fn latest_version(&self) -> Version {
        self.steps.len() as Version
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, version: Version) -> Option<&Step> {
        let idx = usize::try_from(version).ok()?.checked_sub(1)?;
        self.steps.get(idx)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Schema the database should have at `version`: table name → columns.
    ///
    /// Versions beyond the latest are clamped to it.
    pub fn expected_schema(&self, version: Version) -> BTreeMap<&'static str, &'static [&'static str]> {
        let mut schema = BTreeMap::new();
        for step in self.steps.iter().take_while(|s| s.version <= version) {
            step.shape.apply_to(&mut schema);
        }
        schema
    }
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
