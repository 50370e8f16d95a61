//! Moves user and tenant attributes out of their `extra` blobs into the
//! columns added by the previous step, and back.

use super::{encode_extra, parse_extra};
use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::StepShape;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use strata_db::Value;

pub(super) const SHAPE: StepShape = StepShape::UNCHANGED;

#[derive(Debug, Default, Deserialize, Serialize)]
struct UserExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(flatten)]
    rest: Map<String, Json>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct TenantExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(flatten)]
    rest: Map<String, Json>,
}

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    for row in ctx.query(r#"SELECT id, extra FROM "user""#, &[])? {
        let id = row.str(0)?;
        let extra: UserExtra = parse_extra("user", id, row.opt_str(1)?)?;
        ctx.dml(
            r#"UPDATE "user" SET password = ?, enabled = ?, extra = ? WHERE id = ?"#,
            &[
                Value::from(extra.password),
                Value::from(extra.enabled.unwrap_or(true)),
                Value::from(encode_extra("user", id, &extra.rest)?),
                Value::from(id),
            ],
        )?;
    }

    for row in ctx.query("SELECT id, extra FROM tenant", &[])? {
        let id = row.str(0)?;
        let extra: TenantExtra = parse_extra("tenant", id, row.opt_str(1)?)?;
        ctx.dml(
            "UPDATE tenant SET description = ?, enabled = ?, extra = ? WHERE id = ?",
            &[
                Value::from(extra.description),
                Value::from(extra.enabled.unwrap_or(true)),
                Value::from(encode_extra("tenant", id, &extra.rest)?),
                Value::from(id),
            ],
        )?;
    }
    Ok(())
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    for row in ctx.query(r#"SELECT id, extra, password, enabled FROM "user""#, &[])? {
        let id = row.str(0)?;
        let rest: Map<String, Json> = parse_extra("user", id, row.opt_str(1)?)?;
        let folded = UserExtra {
            password: row.opt_str(2)?.map(str::to_string),
            enabled: Some(row.opt_bool(3)?.unwrap_or(true)),
            rest,
        };
        ctx.dml(
            r#"UPDATE "user" SET password = NULL, enabled = TRUE, extra = ? WHERE id = ?"#,
            &[
                Value::from(encode_extra("user", id, &folded)?),
                Value::from(id),
            ],
        )?;
    }

    for row in ctx.query("SELECT id, extra, description, enabled FROM tenant", &[])? {
        let id = row.str(0)?;
        let rest: Map<String, Json> = parse_extra("tenant", id, row.opt_str(1)?)?;
        let folded = TenantExtra {
            description: row.opt_str(2)?.map(str::to_string),
            enabled: Some(row.opt_bool(3)?.unwrap_or(true)),
            rest,
        };
        ctx.dml(
            "UPDATE tenant SET description = NULL, enabled = TRUE, extra = ? WHERE id = ?",
            &[
                Value::from(encode_extra("tenant", id, &folded)?),
                Value::from(id),
            ],
        )?;
    }
    Ok(())
}
