//! Table character-set conversion. DuckDB stores all text as UTF-8, so both
//! directions are no-ops; the step keeps its place in the numbering.

use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::StepShape;

pub(super) const SHAPE: StepShape = StepShape::UNCHANGED;

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    log::debug!("Character set already UTF-8 on {}", ctx.db().db_type());
    Ok(())
}

pub(super) fn downgrade(_ctx: &StepContext<'_>) -> TransformResult {
    Ok(())
}
