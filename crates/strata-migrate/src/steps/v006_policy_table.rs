use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[TableShape {
        table: "policy",
        columns: &["id", "type", "blob", "extra"],
    }],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.ddl(include_str!("v006_policy_table.sql"))
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_table("policy")
}
