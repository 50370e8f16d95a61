use super::drop_tables;
use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

/// Tables created by this step, in reverse dependency order for teardown
const TABLES: &[&str] = &[
    "endpoint",
    "service",
    "ec2_credential",
    "token",
    "metadata",
    "user_tenant_membership",
    "role",
    "tenant",
    "user",
];

/// The pre-v3 endpoint table, also rebuilt when endpoints are downgraded
pub(super) const LEGACY_ENDPOINT: TableShape = TableShape {
    table: "endpoint",
    columns: &["id", "region", "service_id", "extra"],
};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "user",
            columns: &["id", "name", "extra"],
        },
        TableShape {
            table: "tenant",
            columns: &["id", "name", "extra"],
        },
        TableShape {
            table: "role",
            columns: &["id", "name"],
        },
        TableShape {
            table: "user_tenant_membership",
            columns: &["user_id", "tenant_id"],
        },
        TableShape {
            table: "metadata",
            columns: &["user_id", "tenant_id", "data"],
        },
        TableShape {
            table: "token",
            columns: &["id", "expires", "extra"],
        },
        TableShape {
            table: "ec2_credential",
            columns: &["access", "secret", "user_id", "tenant_id"],
        },
        TableShape {
            table: "service",
            columns: &["id", "type", "extra"],
        },
        LEGACY_ENDPOINT,
    ],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.ddl(include_str!("v001_initial_tables.sql"))
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    drop_tables(ctx, TABLES)
}
