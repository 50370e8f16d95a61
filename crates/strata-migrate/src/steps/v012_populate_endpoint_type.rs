//! Splits every legacy endpoint into one row per interface URL.
//!
//! A legacy endpoint keeps its URLs in `extra` as `publicurl`, `internalurl`
//! and `adminurl`. Each URL present becomes an `endpoint_v3` row with a fresh
//! id, a back-reference to the legacy id, the shared region and service, and
//! whatever else was in `extra`.

use super::{encode_extra, parse_extra};
use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::StepShape;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use strata_db::Value;

pub(super) const SHAPE: StepShape = StepShape::UNCHANGED;

/// Interfaces in the order their rows are created
pub(super) const INTERFACES: [&str; 3] = ["public", "internal", "admin"];

#[derive(Debug, Default, Deserialize)]
struct LegacyEndpointExtra {
    #[serde(default)]
    publicurl: Option<String>,
    #[serde(default)]
    internalurl: Option<String>,
    #[serde(default)]
    adminurl: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Json>,
}

impl LegacyEndpointExtra {
    fn urls(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (INTERFACES[0], self.publicurl.as_deref()),
            (INTERFACES[1], self.internalurl.as_deref()),
            (INTERFACES[2], self.adminurl.as_deref()),
        ]
    }
}

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    let legacy = ctx.query(
        "SELECT id, region, service_id, extra FROM endpoint ORDER BY id",
        &[],
    )?;

    let mut created = 0usize;
    for row in &legacy {
        let legacy_id = row.str(0)?;
        let region = row.opt_str(1)?;
        let service_id = row.opt_str(2)?;
        let extra: LegacyEndpointExtra = parse_extra("endpoint", legacy_id, row.opt_str(3)?)?;
        let shared_extra = encode_extra("endpoint", legacy_id, &extra.rest)?;

        for (interface, url) in extra.urls() {
            let Some(url) = url else { continue };
            ctx.dml(
                "INSERT INTO endpoint_v3
                     (id, legacy_endpoint_id, interface, region, service_id, url, extra)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                &[
                    Value::from(ctx.new_id()),
                    Value::from(legacy_id),
                    Value::from(interface),
                    Value::from(region),
                    Value::from(service_id),
                    Value::from(url),
                    Value::from(shared_extra.as_str()),
                ],
            )?;
            created += 1;
        }
    }

    log::debug!(
        "Split {} legacy endpoint(s) into {created} row(s)",
        legacy.len()
    );
    Ok(())
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.dml("DELETE FROM endpoint_v3", &[])?;
    Ok(())
}
