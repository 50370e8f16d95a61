//! Retires the legacy endpoint table in favour of per-interface rows.
//!
//! The downgrade rebuilds the legacy table by coalescing every group of rows
//! that share a `legacy_endpoint_id` (or, for rows created after the split,
//! just the row itself) back into one endpoint with `{interface}url` keys.

use super::v001_initial_tables::LEGACY_ENDPOINT;
use super::v011_endpoints_v3::ENDPOINT_COLUMNS;
use super::{encode_extra, parse_extra};
use crate::context::StepContext;
use crate::error::{TransformError, TransformResult};
use crate::shape::{StepShape, TableShape};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use strata_db::{Row, Value};

pub(super) const SHAPE: StepShape = StepShape {
    tables: &[TableShape {
        table: "endpoint",
        columns: ENDPOINT_COLUMNS,
    }],
    removed: &["endpoint_v3"],
};

const CREATE_LEGACY_ENDPOINT: &str = "CREATE TABLE endpoint (
    id         VARCHAR(64) NOT NULL,
    region     VARCHAR(255),
    service_id VARCHAR(64) NOT NULL,
    extra      TEXT
)";

pub(super) fn upgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.drop_table(LEGACY_ENDPOINT.table)?;
    ctx.rename_table("endpoint_v3", "endpoint")
}

pub(super) fn downgrade(ctx: &StepContext<'_>) -> TransformResult {
    ctx.rename_table("endpoint", "endpoint_v3")?;
    ctx.ddl(CREATE_LEGACY_ENDPOINT)?;

    let rows = ctx.query(
        "SELECT id, legacy_endpoint_id, interface, region, service_id, url, extra
         FROM endpoint_v3
         ORDER BY id",
        &[],
    )?;
    let merged = coalesce(&rows)?;

    for (legacy_id, endpoint) in &merged {
        ctx.dml(
            "INSERT INTO endpoint (id, region, service_id, extra) VALUES (?, ?, ?, ?)",
            &[
                Value::from(legacy_id),
                Value::from(endpoint.region.as_deref()),
                Value::from(endpoint.service_id.as_deref()),
                Value::from(encode_extra("endpoint", legacy_id, &endpoint.extra)?),
            ],
        )?;
    }
    log::debug!(
        "Coalesced {} endpoint row(s) into {} legacy endpoint(s)",
        rows.len(),
        merged.len()
    );
    Ok(())
}

#[derive(Debug)]
struct LegacyEndpoint {
    region: Option<String>,
    service_id: Option<String>,
    extra: Map<String, Json>,
}

/// A legacy endpoint under construction. URLs stay apart from `extra` until
/// the whole group has been read.
#[derive(Debug)]
struct Group {
    region: Option<String>,
    service_id: Option<String>,
    urls: BTreeMap<String, Option<String>>,
    extra: Map<String, Json>,
}

/// Group per-interface rows by legacy id and merge each group.
///
/// Rows in one group must agree on region, service and every shared `extra`
/// key, and may not repeat an interface. An `{interface}url` key already in
/// `extra` must match that interface's URL.
fn coalesce(rows: &[Row]) -> Result<BTreeMap<String, LegacyEndpoint>, TransformError> {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for row in rows {
        let id = row.str(0)?;
        let legacy_id = row.opt_str(1)?.unwrap_or(id).to_string();
        let interface = row.str(2)?;
        let region = row.opt_str(3)?;
        let service_id = row.opt_str(4)?;
        let url = row.opt_str(5)?;
        let extra: Map<String, Json> = parse_extra("endpoint", id, row.opt_str(6)?)?;

        let reject = |reason: String| conflict(&legacy_id, reason);

        if let Some(existing) = groups.get(&legacy_id) {
            if existing.region.as_deref() != region {
                return Err(reject(format!(
                    "row '{id}' has region {region:?}, expected {:?}",
                    existing.region
                )));
            }
            if existing.service_id.as_deref() != service_id {
                return Err(reject(format!(
                    "row '{id}' has service {service_id:?}, expected {:?}",
                    existing.service_id
                )));
            }
        }
        let group = groups.entry(legacy_id.clone()).or_insert_with(|| Group {
            region: region.map(str::to_string),
            service_id: service_id.map(str::to_string),
            urls: BTreeMap::new(),
            extra: Map::new(),
        });

        if group.urls.contains_key(interface) {
            return Err(reject(format!(
                "more than one '{interface}' row (second is '{id}')"
            )));
        }
        group
            .urls
            .insert(interface.to_string(), url.map(str::to_string));

        for (key, value) in extra {
            match group.extra.get(&key) {
                Some(existing) if *existing != value => {
                    return Err(reject(format!(
                        "row '{id}' disagrees on extra key '{key}'"
                    )));
                }
                Some(_) => {}
                None => {
                    group.extra.insert(key, value);
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|(legacy_id, group)| {
            let mut extra = group.extra;
            for (interface, url) in group.urls {
                let Some(url) = url else { continue };
                let url_key = format!("{interface}url");
                match extra.get(&url_key) {
                    Some(existing) if existing.as_str() != Some(url.as_str()) => {
                        return Err(conflict(
                            &legacy_id,
                            format!("extra key '{url_key}' disagrees with the '{interface}' row"),
                        ));
                    }
                    _ => {
                        extra.insert(url_key, Json::from(url));
                    }
                }
            }
            let endpoint = LegacyEndpoint {
                region: group.region,
                service_id: group.service_id,
                extra,
            };
            Ok((legacy_id, endpoint))
        })
        .collect()
}

fn conflict(legacy_id: &str, reason: String) -> TransformError {
    TransformError::Conflict {
        table: "endpoint",
        key: legacy_id.to_string(),
        reason,
    }
}
