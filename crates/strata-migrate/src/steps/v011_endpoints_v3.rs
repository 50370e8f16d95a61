use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

/// Per-interface endpoint layout, first as `endpoint_v3` and later as `endpoint`
pub(super) const ENDPOINT_COLUMNS: &[&str] = &[
    "id",
    "legacy_endpoint_id",
    "interface",
    "region",
    "service_id",
    "url",
    "extra",
];

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[TableShape {
        table: "endpoint_v3",
        columns: ENDPOINT_COLUMNS,
    }],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.ddl(include_str!("v011_endpoints_v3.sql"))
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_table("endpoint_v3")
}
