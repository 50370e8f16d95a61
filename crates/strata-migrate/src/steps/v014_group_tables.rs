use super::drop_tables;
use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "group",
            columns: &["id", "domain_id", "name", "description", "extra"],
        },
        TableShape {
            table: "group_project_metadata",
            columns: &["group_id", "project_id", "data"],
        },
        TableShape {
            table: "group_domain_metadata",
            columns: &["group_id", "domain_id", "data"],
        },
        TableShape {
            table: "user_group_membership",
            columns: &["user_id", "group_id"],
        },
    ],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.ddl(include_str!("v014_group_tables.sql"))
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    drop_tables(
        ctx,
        &[
            "user_group_membership",
            "group_domain_metadata",
            "group_project_metadata",
            "group",
        ],
    )
}
