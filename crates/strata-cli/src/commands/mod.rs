//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod downgrade;
pub(crate) mod status;
pub(crate) mod upgrade;
pub(crate) mod version;
