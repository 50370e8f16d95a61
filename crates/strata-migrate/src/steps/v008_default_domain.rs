//! Seeds the domain that owns everything created before domains existed.

use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::StepShape;
use strata_db::Value;

pub(super) const SHAPE: StepShape = StepShape::UNCHANGED;

const DEFAULT_DOMAIN_NAME: &str = "Default";
const DEFAULT_DOMAIN_EXTRA: &str =
    r#"{"description": "Owns users and projects created before domains existed"}"#;

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    let domain_id = &ctx.settings().default_domain_id;
    let inserted = ctx.dml(
        "INSERT INTO domain (id, name, enabled, extra)
         SELECT ?, ?, TRUE, ?
         WHERE NOT EXISTS (SELECT 1 FROM domain WHERE id = ?)",
        &[
            Value::from(domain_id),
            Value::from(DEFAULT_DOMAIN_NAME),
            Value::from(DEFAULT_DOMAIN_EXTRA),
            Value::from(domain_id),
        ],
    )?;
    if inserted == 0 {
        log::debug!("Default domain '{domain_id}' already present");
    }
    Ok(())
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.dml(
        "DELETE FROM domain WHERE id = ?",
        &[Value::from(&ctx.settings().default_domain_id)],
    )?;
    Ok(())
}
