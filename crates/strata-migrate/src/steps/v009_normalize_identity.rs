use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "user",
            columns: &["id", "name", "extra", "password", "enabled"],
        },
        TableShape {
            table: "tenant",
            columns: &["id", "name", "extra", "description", "enabled"],
        },
        TableShape {
            table: "role",
            columns: &["id", "name", "extra"],
        },
    ],
    removed: &[],
};

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.add_column("user", "password", "VARCHAR(128)")?;
    ctx.add_column("user", "enabled", "BOOLEAN DEFAULT TRUE")?;
    ctx.add_column("tenant", "description", "TEXT")?;
    ctx.add_column("tenant", "enabled", "BOOLEAN DEFAULT TRUE")?;
    ctx.add_column("role", "extra", "TEXT")
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_column("role", "extra")?;
    ctx.drop_column("tenant", "enabled")?;
    ctx.drop_column("tenant", "description")?;
    ctx.drop_column("user", "enabled")?;
    ctx.drop_column("user", "password")
}
