//! Adds a SHA-256 digest of each token id.

use crate::context::StepContext;
use crate::error::TransformResult;
use crate::shape::{StepShape, TableShape};
use sha2::{Digest, Sha256};
use strata_db::Value;

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[TableShape {
        table: "token",
        columns: &["id", "expires", "extra", "valid", "id_hash"],
    }],
    removed: &[],
};

/// Lowercase hex SHA-256 of `token_id`
pub(super) fn hash_token_id(token_id: &str) -> String {
    format!("{:x}", Sha256::digest(token_id.as_bytes()))
}

/// Add `token.id_hash` and fill it for every existing token.
pub(super) fn add_id_hash(ctx: &StepContext<'_>) -> TransformResult {
    ctx.add_column("token", "id_hash", "VARCHAR(64)")?;

    let rows = ctx.query("SELECT id FROM token", &[])?;
    for row in &rows {
        let id = row.str(0)?;
        ctx.dml(
            "UPDATE token SET id_hash = ? WHERE id = ?",
            &[Value::from(hash_token_id(id)), Value::from(id)],
        )?;
    }
    log::debug!("Hashed {} token id(s)", rows.len());
    Ok(())
}

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    add_id_hash(ctx)
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_column("token", "id_hash")
}
