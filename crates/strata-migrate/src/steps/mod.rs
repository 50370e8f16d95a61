//! The identity schema history.
//!
//! Each step lives in its own numbered module exposing `upgrade`, `downgrade`
//! and `SHAPE`. Pure DDL is embedded from `.sql` files next to the module.
//! [`STEPS`] is consumed by [`crate::Repository::builtin`].

use crate::context::StepContext;
use crate::error::TransformError;
use crate::repository::StepDef;
use serde::de::DeserializeOwned;
use serde::Serialize;

mod v001_initial_tables;
mod v002_token_valid;
mod v003_token_id_hash;
mod v004_undo_token_id_hash;
mod v005_character_set;
mod v006_policy_table;
mod v007_domain_tables;
mod v008_default_domain;
mod v009_normalize_identity;
mod v010_normalize_identity_migration;
mod v011_endpoints_v3;
mod v012_populate_endpoint_type;
mod v013_drop_legacy_endpoints;
mod v014_group_tables;
mod v015_tenant_to_project;
mod v016_normalize_domain_ids;

macro_rules! step {
    ($version:expr, $name:literal, $module:ident) => {
        StepDef {
            version: $version,
            name: $name,
            upgrade: Some($module::upgrade),
            downgrade: Some($module::downgrade),
            shape: $module::SHAPE,
        }
    };
}

/// All known steps, in order.
pub static STEPS: &[StepDef] = &[
    step!(1, "initial_tables", v001_initial_tables),
    step!(2, "token_valid", v002_token_valid),
    step!(3, "token_id_hash", v003_token_id_hash),
    step!(4, "undo_token_id_hash", v004_undo_token_id_hash),
    step!(5, "character_set", v005_character_set),
    step!(6, "policy_table", v006_policy_table),
    step!(7, "domain_tables", v007_domain_tables),
    step!(8, "default_domain", v008_default_domain),
    step!(9, "normalize_identity", v009_normalize_identity),
    step!(10, "normalize_identity_migration", v010_normalize_identity_migration),
    step!(11, "endpoints_v3", v011_endpoints_v3),
    step!(12, "populate_endpoint_type", v012_populate_endpoint_type),
    step!(13, "drop_legacy_endpoints", v013_drop_legacy_endpoints),
    step!(14, "group_tables", v014_group_tables),
    step!(15, "tenant_to_project", v015_tenant_to_project),
    step!(16, "normalize_domain_ids", v016_normalize_domain_ids),
];

/// Decode a JSON `extra` blob. NULL decodes to the default value.
pub(crate) fn parse_extra<T>(
    table: &'static str,
    id: &str,
    raw: Option<&str>,
) -> Result<T, TransformError>
where
    T: DeserializeOwned + Default,
{
    match raw {
        None => Ok(T::default()),
        Some(text) => serde_json::from_str(text).map_err(|e| TransformError::MalformedRow {
            table,
            column: "extra",
            id: id.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Encode a value back into an `extra` blob.
pub(crate) fn encode_extra<T: Serialize>(
    table: &'static str,
    id: &str,
    value: &T,
) -> Result<String, TransformError> {
    serde_json::to_string(value).map_err(|e| TransformError::MalformedRow {
        table,
        column: "extra",
        id: id.to_string(),
        message: e.to_string(),
    })
}

/// Drop `tables` in order.
pub(crate) fn drop_tables(ctx: &StepContext<'_>, tables: &[&str]) -> Result<(), TransformError> {
    for table in tables {
        ctx.drop_table(table)?;
    }
    Ok(())
}
