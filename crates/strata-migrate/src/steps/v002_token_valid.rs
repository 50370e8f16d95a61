use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[TableShape {
        table: "token",
        columns: &["id", "expires", "extra", "valid"],
    }],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.add_column("token", "valid", "BOOLEAN DEFAULT TRUE")
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_column("token", "valid")
}
