use super::drop_tables;
use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "credential",
            columns: &["id", "user_id", "project_id", "blob", "type", "extra"],
        },
        TableShape {
            table: "domain",
            columns: &["id", "name", "enabled", "extra"],
        },
        TableShape {
            table: "user_domain_metadata",
            columns: &["user_id", "domain_id", "data"],
        },
    ],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.ddl(include_str!("v007_domain_tables.sql"))
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    drop_tables(ctx, &["user_domain_metadata", "domain", "credential"])
}
