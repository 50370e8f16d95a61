//! Version numbers and step direction.

use std::fmt;

/// Schema version. 0 is the empty schema.
pub type Version = u32;

/// Which body of a step to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Upgrade,
    Downgrade,
}

impl Direction {
    /// Version the marker holds after running `step_version` in this direction
    pub fn resulting_version(self, step_version: Version) -> Version {
        match self {
            Direction::Upgrade => step_version,
            Direction::Downgrade => step_version.saturating_sub(1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upgrade => write!(f, "upgrade"),
            Direction::Downgrade => write!(f, "downgrade"),
        }
    }
}
