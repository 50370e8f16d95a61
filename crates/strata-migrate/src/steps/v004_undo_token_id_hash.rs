use super::v003_token_id_hash::add_id_hash;
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
    ctx.drop_column("token", "id_hash")
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    add_id_hash(ctx)
}
