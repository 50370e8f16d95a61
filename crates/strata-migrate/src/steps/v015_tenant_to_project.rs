//! Renames tenants to projects, including the tables and columns that
//! reference them.

use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "project",
            columns: &["id", "name", "extra", "description", "enabled"],
        },
        TableShape {
            table: "user_project_membership",
            columns: &["user_id", "project_id"],
        },
        TableShape {
            table: "user_project_metadata",
            columns: &["user_id", "project_id", "data"],
        },
        TableShape {
            table: "ec2_credential",
            columns: &["access", "secret", "user_id", "project_id"],
        },
    ],
    removed: &["tenant", "user_tenant_membership", "metadata"],
};

/// `(tenant-era name, project-era name)` for tables that carry a `tenant_id`
const RENAMED_REFERENCES: &[(&str, &str)] = &[
    ("user_tenant_membership", "user_project_membership"),
    ("metadata", "user_project_metadata"),
];

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.rename_table("tenant", "project")?;
    for (from, to) in RENAMED_REFERENCES {
        ctx.rename_table(from, to)?;
        ctx.rename_column(to, "tenant_id", "project_id")?;
    }
    ctx.rename_column("ec2_credential", "tenant_id", "project_id")
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.rename_column("ec2_credential", "project_id", "tenant_id")?;
    for (from, to) in RENAMED_REFERENCES.iter().rev() {
        ctx.rename_column(to, "project_id", "tenant_id")?;
        ctx.rename_table(to, from)?;
    }
    ctx.rename_table("project", "tenant")
}
