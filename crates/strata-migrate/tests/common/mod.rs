//! Shared harness for the upgrade suite.

#![allow(dead_code)]

pub mod fixtures;

use serde_json::{Map, Value as Json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_db::{Database, DuckDbBackend, Value};
use strata_migrate::shape::compare;
use strata_migrate::{
    IdGenerator, MigrationSettings, Migrator, Repository, Version, VERSION_TABLE,
};

/// Predictable ids: `gen-0001`, `gen-0002`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("gen-{n:04}")
    }
}

/// Which optional columns the fixtures are written into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    /// id, name, extra
    Legacy,
    /// plus password/description and enabled
    Normalized,
    /// plus domain_id (tenants go to `project`)
    DomainScoped,
}

pub fn new_db() -> DuckDbBackend {
    DuckDbBackend::in_memory().unwrap()
}

pub fn migrator(db: &dyn Database) -> Migrator<'_> {
    Migrator::new(
        db,
        Arc::new(Repository::builtin().unwrap()),
        MigrationSettings::default(),
    )
    .with_id_generator(SequentialIds::default())
}

/// Migrate to `version`, asserting the marker lands there.
pub fn migrate(db: &dyn Database, version: Version) {
    let reached = migrator(db).migrate(i64::from(version)).unwrap();
    assert_eq!(reached, version);
    assert_eq!(migrator(db).current_version().unwrap(), version);
}

pub fn latest() -> Version {
    Repository::builtin().unwrap().latest_version()
}

pub fn assert_table_columns(db: &dyn Database, table: &str, expected: &[&str]) {
    let actual = db.table_columns(table).unwrap();
    assert_eq!(actual, expected, "{table} table");
}

pub fn assert_table_exists(db: &dyn Database, table: &str) {
    assert!(db.exists(table).unwrap(), "table '{table}' does not exist");
}

pub fn assert_table_does_not_exist(db: &dyn Database, table: &str) {
    assert!(!db.exists(table).unwrap(), "table '{table}' already exists");
}

/// Assert the live schema is exactly what the repository declares at `version`.
pub fn assert_schema_at(db: &dyn Database, version: Version) {
    let repository = Repository::builtin().unwrap();
    let expected = repository.expected_schema(version);
    let mismatches = compare(db, &expected, &[VERSION_TABLE]).unwrap();
    assert!(
        mismatches.is_empty(),
        "schema at version {version}:\n{}",
        mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Split a fixture into (id, name, remaining fields).
fn split_fixture(fixture: &Json) -> (String, String, Map<String, Json>) {
    let mut extra = fixture.as_object().cloned().unwrap();
    let id = extra.remove("id").unwrap().as_str().unwrap().to_string();
    let name = extra.remove("name").unwrap().as_str().unwrap().to_string();
    (id, name, extra)
}

fn take_enabled(extra: &mut Map<String, Json>) -> bool {
    extra
        .remove("enabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(true)
}

fn take_str(extra: &mut Map<String, Json>, key: &str) -> Option<String> {
    extra
        .remove(key)
        .and_then(|v| v.as_str().map(str::to_string))
}

pub fn populate_user_table(db: &dyn Database, columns: Columns) {
    for user in fixtures::users() {
        let (id, name, mut extra) = split_fixture(&user);
        match columns {
            Columns::Legacy => {
                db.execute_dml(
                    r#"INSERT INTO "user" (id, name, extra) VALUES (?, ?, ?)"#,
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
            Columns::Normalized => {
                let password = take_str(&mut extra, "password");
                let enabled = take_enabled(&mut extra);
                db.execute_dml(
                    r#"INSERT INTO "user" (id, name, password, enabled, extra)
                       VALUES (?, ?, ?, ?, ?)"#,
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(password),
                        Value::from(enabled),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
            Columns::DomainScoped => {
                let password = take_str(&mut extra, "password");
                let enabled = take_enabled(&mut extra);
                let domain_id = take_str(&mut extra, "domain_id");
                db.execute_dml(
                    r#"INSERT INTO "user" (id, name, domain_id, password, enabled, extra)
                       VALUES (?, ?, ?, ?, ?, ?)"#,
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(domain_id),
                        Value::from(password),
                        Value::from(enabled),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
        }
    }
}

pub fn populate_tenant_table(db: &dyn Database, columns: Columns) {
    for tenant in fixtures::tenants() {
        let (id, name, mut extra) = split_fixture(&tenant);
        match columns {
            Columns::Legacy => {
                db.execute_dml(
                    "INSERT INTO tenant (id, name, extra) VALUES (?, ?, ?)",
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
            Columns::Normalized => {
                let description = take_str(&mut extra, "description");
                let enabled = take_enabled(&mut extra);
                db.execute_dml(
                    "INSERT INTO tenant (id, name, description, enabled, extra)
                     VALUES (?, ?, ?, ?, ?)",
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(description),
                        Value::from(enabled),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
            Columns::DomainScoped => {
                let description = take_str(&mut extra, "description");
                let enabled = take_enabled(&mut extra);
                let domain_id = take_str(&mut extra, "domain_id");
                db.execute_dml(
                    "INSERT INTO project (id, name, domain_id, description, enabled, extra)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    &[
                        Value::from(id),
                        Value::from(name),
                        Value::from(domain_id),
                        Value::from(description),
                        Value::from(enabled),
                        Value::from(Json::Object(extra).to_string()),
                    ],
                )
                .unwrap();
            }
        }
    }
}

/// Single-row lookup by id, selecting `columns`.
pub fn select_by_id(db: &dyn Database, table: &str, columns: &str, id: &str) -> strata_db::Row {
    let mut rows = db
        .query(
            &format!(
                "SELECT {columns} FROM {} WHERE id = ?",
                strata_db::quote_ident(table)
            ),
            &[Value::from(id)],
        )
        .unwrap();
    assert_eq!(rows.len(), 1, "expected one {table} row with id '{id}'");
    rows.remove(0)
}

pub fn count(db: &dyn Database, table: &str) -> i64 {
    db.query(
        &format!("SELECT COUNT(*) FROM {}", strata_db::quote_ident(table)),
        &[],
    )
    .unwrap()[0]
        .int(0)
        .unwrap()
}
