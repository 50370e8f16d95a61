//! Scopes users and projects to a domain, backfilling the default domain.

use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};
use strata_db::{quote_ident, Value};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[
        TableShape {
            table: "user",
            columns: &["id", "name", "extra", "password", "enabled", "domain_id"],
        },
        TableShape {
            table: "project",
            columns: &["id", "name", "extra", "description", "enabled", "domain_id"],
        },
    ],
    removed: &[],
};

const SCOPED_TABLES: [&str; 2] = ["user", "project"];

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    let domain_id = &ctx.settings().default_domain_id;
    for table in SCOPED_TABLES {
        ctx.add_column(table, "domain_id", "VARCHAR(64)")?;
        let updated = ctx.dml(
            &format!("UPDATE {} SET domain_id = ?", quote_ident(table)),
            &[Value::from(domain_id)],
        )?;
        log::debug!("Assigned {updated} {table} row(s) to domain '{domain_id}'");
    }
    Ok(())
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    for table in SCOPED_TABLES.iter().rev() {
        ctx.drop_column(table, "domain_id")?;
    }
    Ok(())
}
