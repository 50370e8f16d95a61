//! Upgrade suite for the built-in identity schema history.
//!
//! Every test starts from a blank in-memory database and walks it through the
//! steps it cares about, checking table shapes and the data carried across.

mod common;

use common::fixtures::{self, DEFAULT_DOMAIN_ID};
use common::*;
use serde_json::{json, Value as Json};
use std::sync::Arc;
use strata_db::{Database, DuckDbBackend, Value};
use strata_migrate::{
    Direction, MigrationError, MigrationSettings, MigrationStatus, Migrator, Repository,
    StepError, TransformError, VersionTracker, VERSION_TABLE,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn insert_service(db: &dyn Database, id: &str) {
    db.execute_dml(
        "INSERT INTO service (id, type, extra) VALUES (?, ?, ?)",
        &[
            Value::from(id),
            Value::from("identity"),
            Value::from(json!({"name": "keystone"}).to_string()),
        ],
    )
    .unwrap();
}

fn insert_legacy_endpoint(db: &dyn Database, id: &str, region: &str, service_id: &str, extra: &Json) {
    db.execute_dml(
        "INSERT INTO endpoint (id, region, service_id, extra) VALUES (?, ?, ?, ?)",
        &[
            Value::from(id),
            Value::from(region),
            Value::from(service_id),
            Value::from(extra.to_string()),
        ],
    )
    .unwrap();
}

#[allow(clippy::too_many_arguments)]
fn insert_interface_endpoint(
    db: &dyn Database,
    id: &str,
    legacy_endpoint_id: Option<&str>,
    interface: &str,
    region: &str,
    service_id: &str,
    url: &str,
    extra: &Json,
) {
    db.execute_dml(
        "INSERT INTO endpoint
             (id, legacy_endpoint_id, interface, region, service_id, url, extra)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        &[
            Value::from(id),
            Value::from(legacy_endpoint_id),
            Value::from(interface),
            Value::from(region),
            Value::from(service_id),
            Value::from(url),
            Value::from(extra.to_string()),
        ],
    )
    .unwrap();
}

fn parse(text: &str) -> Json {
    serde_json::from_str(text).unwrap()
}

fn assert_tenant_tables(db: &dyn Database) {
    assert_table_exists(db, "tenant");
    assert_table_exists(db, "user_tenant_membership");
    assert_table_does_not_exist(db, "project");
    assert_table_does_not_exist(db, "user_project_membership");
}

fn assert_project_tables(db: &dyn Database) {
    assert_table_exists(db, "project");
    assert_table_exists(db, "user_project_membership");
    assert_table_does_not_exist(db, "tenant");
    assert_table_does_not_exist(db, "user_tenant_membership");
}

// ── Starting state ─────────────────────────────────────────────────────

#[test]
fn test_blank_db_to_start() {
    let db = new_db();
    assert_table_does_not_exist(&db, "user");
}

#[test]
fn test_start_version_0() {
    let db = new_db();
    assert_eq!(migrator(&db).current_version().unwrap(), 0);
    assert_table_exists(&db, VERSION_TABLE);
    assert_eq!(db.list_tables().unwrap(), vec![VERSION_TABLE.to_string()]);
}

#[test]
fn test_builtin_repository_latest() {
    assert_eq!(latest(), 16);
}

// ── Round trips ────────────────────────────────────────────────────────

#[test]
fn test_two_steps_forward_one_step_back() {
    let db = new_db();
    for version in 1..=latest() {
        migrate(&db, version);
        assert_schema_at(&db, version);
        migrate(&db, version - 1);
        assert_schema_at(&db, version - 1);
        migrate(&db, version);
        assert_schema_at(&db, version);
    }
}

#[test]
fn test_schema_matches_declared_shapes_downwards() {
    let db = new_db();
    migrate(&db, latest());
    for version in (0..latest()).rev() {
        migrate(&db, version);
        assert_schema_at(&db, version);
    }
}

#[test]
fn test_each_run_moves_one_version_at_a_time() {
    let db = new_db();
    let migrator = migrator(&db);

    let planned = migrator.plan(i64::from(latest())).unwrap();
    let versions: Vec<_> = planned.iter().map(|p| p.version()).collect();
    assert_eq!(versions, (1..=latest()).collect::<Vec<_>>());
    assert!(planned.iter().all(|p| p.direction() == Direction::Upgrade));

    migrator.upgrade_to_latest().unwrap();
    let planned = migrator.plan(0).unwrap();
    let versions: Vec<_> = planned.iter().map(|p| p.version()).collect();
    assert_eq!(versions, (1..=latest()).rev().collect::<Vec<_>>());
    assert!(planned.iter().all(|p| p.direction() == Direction::Downgrade));
}

#[test]
fn test_downgrade_to_0() {
    let db = new_db();
    migrate(&db, latest());
    migrate(&db, 0);
    for table in ["user", "token", "role", "user_tenant_membership", "metadata"] {
        assert_table_does_not_exist(&db, table);
    }
    assert_eq!(db.list_tables().unwrap(), vec![VERSION_TABLE.to_string()]);
}

#[test]
fn test_teardown_drops_marker() {
    let db = new_db();
    migrate(&db, 3);
    migrate(&db, 0);
    migrator(&db).tracker().drop_marker(&db).unwrap();
    assert!(db.list_tables().unwrap().is_empty());
}

// ── Per-range shapes and data ──────────────────────────────────────────

#[test]
fn test_upgrade_0_to_1() {
    let db = new_db();
    migrate(&db, 1);
    assert_table_columns(&db, "user", &["id", "name", "extra"]);
    assert_table_columns(&db, "tenant", &["id", "name", "extra"]);
    assert_table_columns(&db, "role", &["id", "name"]);
    assert_table_columns(&db, "user_tenant_membership", &["user_id", "tenant_id"]);
    assert_table_columns(&db, "metadata", &["user_id", "tenant_id", "data"]);
    populate_user_table(&db, Columns::Legacy);
    assert_eq!(count(&db, "user"), 3);
}

#[test]
fn test_token_id_hash_backfill() {
    let db = new_db();
    migrate(&db, 2);
    db.execute_dml("INSERT INTO token (id, extra) VALUES ('abc', '{}')", &[])
        .unwrap();
    let row = select_by_id(&db, "token", "valid", "abc");
    assert_eq!(row.opt_bool(0).unwrap(), Some(true));

    migrate(&db, 3);
    let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    let row = select_by_id(&db, "token", "id_hash", "abc");
    assert_eq!(row.str(0).unwrap(), expected);

    migrate(&db, 4);
    assert_table_columns(&db, "token", &["id", "expires", "extra", "valid"]);

    // Going back below 4 recomputes the hash
    migrate(&db, 3);
    let row = select_by_id(&db, "token", "id_hash", "abc");
    assert_eq!(row.str(0).unwrap(), expected);
}

#[test]
fn test_upgrade_5_to_6() {
    let db = new_db();
    migrate(&db, 5);
    assert_table_does_not_exist(&db, "policy");

    migrate(&db, 6);
    assert_table_exists(&db, "policy");
    assert_table_columns(&db, "policy", &["id", "type", "blob", "extra"]);
}

#[test]
fn test_upgrade_6_to_7() {
    let db = new_db();
    migrate(&db, 6);
    assert_table_does_not_exist(&db, "credential");
    assert_table_does_not_exist(&db, "domain");
    assert_table_does_not_exist(&db, "user_domain_metadata");

    migrate(&db, 7);
    assert_table_columns(
        &db,
        "credential",
        &["id", "user_id", "project_id", "blob", "type", "extra"],
    );
    assert_table_columns(&db, "domain", &["id", "name", "enabled", "extra"]);
    assert_table_columns(&db, "user_domain_metadata", &["user_id", "domain_id", "data"]);
}

#[test]
fn test_default_domain_created_and_removed() {
    let db = new_db();
    migrate(&db, 8);
    let row = select_by_id(&db, "domain", "name, enabled", DEFAULT_DOMAIN_ID);
    assert_eq!(row.str(0).unwrap(), "Default");
    assert_eq!(row.opt_bool(1).unwrap(), Some(true));

    migrate(&db, 7);
    assert_eq!(count(&db, "domain"), 0);
}

#[test]
fn test_default_domain_id_is_configurable() {
    let db = new_db();
    let settings = MigrationSettings {
        default_domain_id: "corp".to_string(),
        ..MigrationSettings::default()
    };
    let migrator = Migrator::new(&db, Arc::new(Repository::builtin().unwrap()), settings);
    migrator.migrate(8).unwrap();
    select_by_id(&db, "domain", "name", "corp");

    migrator.migrate(14).unwrap();
    populate_user_table(&db, Columns::Normalized);
    migrator.migrate(16).unwrap();
    let row = select_by_id(&db, "user", "domain_id", "foo");
    assert_eq!(row.str(0).unwrap(), "corp");
}

#[test]
fn test_upgrade_8_to_10() {
    let db = new_db();
    migrate(&db, 8);
    populate_user_table(&db, Columns::Legacy);
    populate_tenant_table(&db, Columns::Legacy);
    migrate(&db, 10);

    assert_table_columns(&db, "user", &["id", "name", "extra", "password", "enabled"]);
    assert_table_columns(
        &db,
        "tenant",
        &["id", "name", "extra", "description", "enabled"],
    );
    assert_table_columns(&db, "role", &["id", "name", "extra"]);
    assert_table_columns(&db, "user_tenant_membership", &["user_id", "tenant_id"]);
    assert_table_columns(&db, "metadata", &["user_id", "tenant_id", "data"]);

    let foo = select_by_id(&db, "user", "enabled, password, extra", "foo");
    assert_eq!(foo.opt_bool(0).unwrap(), Some(true));
    assert_eq!(foo.opt_str(1).unwrap(), Some("foo2"));
    let extra = parse(foo.str(2).unwrap());
    assert!(extra.get("password").is_none());
    assert!(extra.get("enabled").is_none());
    assert_eq!(extra["tenants"], json!(["bar"]));

    let badguy = select_by_id(&db, "user", "enabled", "badguy");
    assert_eq!(badguy.opt_bool(0).unwrap(), Some(false));

    let baz = select_by_id(&db, "tenant", "description, enabled", "baz");
    assert_eq!(baz.opt_str(0).unwrap(), Some("description"));
    assert_eq!(baz.opt_bool(1).unwrap(), Some(true));

    let bar = select_by_id(&db, "tenant", "description", "bar");
    assert_eq!(bar.opt_str(0).unwrap(), None);
}

#[test]
fn test_downgrade_10_to_8() {
    let db = new_db();
    migrate(&db, 10);
    populate_user_table(&db, Columns::Normalized);
    populate_tenant_table(&db, Columns::Normalized);
    migrate(&db, 8);

    assert_table_columns(&db, "user", &["id", "name", "extra"]);
    assert_table_columns(&db, "tenant", &["id", "name", "extra"]);

    let users = fixtures::users();
    let badguy = select_by_id(&db, "user", "name, extra", "badguy");
    assert_eq!(badguy.str(0).unwrap(), users[2]["name"]);
    let extra = parse(badguy.str(1).unwrap());
    assert_eq!(extra["password"], "bad");
    assert_eq!(extra["enabled"], false);

    let tenants = fixtures::tenants();
    let baz = select_by_id(&db, "tenant", "name, extra", "baz");
    assert_eq!(baz.str(0).unwrap(), tenants[1]["name"]);
    assert_eq!(parse(baz.str(1).unwrap())["description"], "description");
}

#[test]
fn test_identity_fields_survive_round_trip() {
    let db = new_db();
    migrate(&db, 8);
    populate_user_table(&db, Columns::Legacy);
    migrate(&db, 10);
    migrate(&db, 9);
    migrate(&db, 10);

    let badguy = select_by_id(&db, "user", "password, enabled", "badguy");
    assert_eq!(badguy.opt_str(0).unwrap(), Some("bad"));
    assert_eq!(badguy.opt_bool(1).unwrap(), Some(false));
}

#[test]
fn test_malformed_extra_stops_migration() {
    let db = new_db();
    migrate(&db, 9);
    db.execute_dml(
        r#"INSERT INTO "user" (id, name, extra) VALUES ('broken', 'B', '{"enabled": "yes"}')"#,
        &[],
    )
    .unwrap();

    let err = migrator(&db).migrate(10).unwrap_err();
    assert_eq!(err.reached(), Some(9));
    match err.step_error() {
        Some(StepError::Transformation {
            source: TransformError::MalformedRow { table, id, .. },
            ..
        }) => {
            assert_eq!(*table, "user");
            assert_eq!(id, "broken");
        }
        other => panic!("expected MalformedRow, got {other:?}"),
    }
    assert_eq!(migrator(&db).current_version().unwrap(), 9);
}

// ── Endpoints ──────────────────────────────────────────────────────────

#[test]
fn test_upgrade_10_to_13() {
    let db = new_db();
    migrate(&db, 10);
    insert_service(&db, "svc1");
    let endpoint_extra = json!({
        "publicurl": "http://public:5000",
        "internalurl": "http://internal:5000",
        "adminurl": "http://admin:35357",
    });
    insert_legacy_endpoint(&db, "legacy1", "RegionOne", "svc1", &endpoint_extra);

    migrate(&db, 13);
    assert_table_columns(&db, "service", &["id", "type", "extra"]);
    assert_table_columns(
        &db,
        "endpoint",
        &[
            "id",
            "legacy_endpoint_id",
            "interface",
            "region",
            "service_id",
            "url",
            "extra",
        ],
    );
    assert_table_does_not_exist(&db, "endpoint_v3");
    assert_eq!(count(&db, "endpoint"), 3);

    for interface in ["public", "internal", "admin"] {
        let rows = db
            .query(
                "SELECT id, legacy_endpoint_id, region, service_id, url, extra
                 FROM endpoint WHERE legacy_endpoint_id = ? AND interface = ?",
                &[Value::from("legacy1"), Value::from(interface)],
            )
            .unwrap();
        assert_eq!(rows.len(), 1, "{interface} endpoint");
        let row = &rows[0];
        assert_ne!(row.str(0).unwrap(), "legacy1");
        assert_eq!(row.str(1).unwrap(), "legacy1");
        assert_eq!(row.str(2).unwrap(), "RegionOne");
        assert_eq!(row.str(3).unwrap(), "svc1");
        assert_eq!(row.str(4).unwrap(), endpoint_extra[format!("{interface}url")]);
        assert_eq!(row.str(5).unwrap(), "{}");
    }
}

#[test]
fn test_fan_out_ids_come_from_generator() {
    let db = new_db();
    migrate(&db, 11);
    insert_service(&db, "svc1");
    insert_legacy_endpoint(
        &db,
        "legacy1",
        "RegionOne",
        "svc1",
        &json!({"publicurl": "p", "adminurl": "a", "weight": 3}),
    );
    migrate(&db, 12);

    let rows = db
        .query(
            "SELECT id, interface, extra FROM endpoint_v3 ORDER BY id",
            &[],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].str(0).unwrap(), "gen-0001");
    assert_eq!(rows[0].str(1).unwrap(), "public");
    assert_eq!(rows[1].str(0).unwrap(), "gen-0002");
    assert_eq!(rows[1].str(1).unwrap(), "admin");
    assert_eq!(parse(rows[0].str(2).unwrap()), json!({"weight": 3}));

    // Downgrading empties the new table and leaves the legacy one alone
    migrate(&db, 11);
    assert_eq!(count(&db, "endpoint_v3"), 0);
    assert_eq!(count(&db, "endpoint"), 1);
}

#[test]
fn test_downgrade_13_to_9() {
    let db = new_db();
    migrate(&db, 13);
    insert_service(&db, "svc1");

    let common_extra = json!({});
    let endpoints = [
        ("public", "ep-public", "http://public"),
        ("internal", "ep-internal", "http://internal"),
        ("admin", "ep-admin", "http://admin"),
    ];
    for (interface, id, url) in endpoints {
        insert_interface_endpoint(
            &db,
            id,
            Some("legacy1"),
            interface,
            "RegionOne",
            "svc1",
            url,
            &common_extra,
        );
    }

    migrate(&db, 9);
    assert_table_columns(&db, "service", &["id", "type", "extra"]);
    assert_table_columns(&db, "endpoint", &["id", "region", "service_id", "extra"]);
    assert_table_does_not_exist(&db, "endpoint_v3");
    assert_eq!(count(&db, "endpoint"), 1);

    let legacy = select_by_id(&db, "endpoint", "region, service_id, extra", "legacy1");
    assert_eq!(legacy.str(0).unwrap(), "RegionOne");
    assert_eq!(legacy.str(1).unwrap(), "svc1");
    let extra = parse(legacy.str(2).unwrap());
    for (interface, _, url) in endpoints {
        assert_eq!(extra[format!("{interface}url")], url);
    }
}

#[test]
fn test_endpoint_without_legacy_id_coalesces_alone() {
    let db = new_db();
    migrate(&db, 13);
    insert_service(&db, "svc1");
    insert_interface_endpoint(
        &db,
        "solo",
        None,
        "public",
        "RegionTwo",
        "svc1",
        "http://solo",
        &json!({"note": "added after the split"}),
    );

    migrate(&db, 12);
    let legacy = select_by_id(&db, "endpoint", "region, extra", "solo");
    assert_eq!(legacy.str(0).unwrap(), "RegionTwo");
    assert_eq!(
        parse(legacy.str(1).unwrap()),
        json!({"publicurl": "http://solo", "note": "added after the split"})
    );
}

#[test]
fn test_coalesce_conflict_leaves_version_13() {
    let db = new_db();
    migrate(&db, 13);
    insert_service(&db, "svc1");
    insert_interface_endpoint(&db, "a", Some("legacy1"), "public", "RegionOne", "svc1", "u1", &json!({}));
    insert_interface_endpoint(&db, "b", Some("legacy1"), "admin", "RegionTwo", "svc1", "u2", &json!({}));

    let err = migrator(&db).migrate(12).unwrap_err();
    assert_eq!(err.reached(), Some(13));
    assert!(matches!(
        err.step_error(),
        Some(StepError::Transformation {
            version: 13,
            direction: Direction::Downgrade,
            source: TransformError::Conflict { .. },
            ..
        })
    ));

    // Nothing of the failed step is visible
    assert_eq!(migrator(&db).current_version().unwrap(), 13);
    assert_schema_at(&db, 13);
    assert_eq!(count(&db, "endpoint"), 2);
}

#[test]
fn test_endpoints_survive_full_round_trip() {
    let db = new_db();
    migrate(&db, 11);
    insert_service(&db, "svc1");
    let extra = json!({"publicurl": "p", "internalurl": "i", "adminurl": "a"});
    insert_legacy_endpoint(&db, "legacy1", "RegionOne", "svc1", &extra);

    migrate(&db, 13);
    migrate(&db, 12);

    let legacy = select_by_id(&db, "endpoint", "region, service_id, extra", "legacy1");
    assert_eq!(legacy.str(0).unwrap(), "RegionOne");
    assert_eq!(parse(legacy.str(2).unwrap()), extra);
}

// ── Groups, projects and domains ───────────────────────────────────────

#[test]
fn test_upgrade_13_to_14() {
    let db = new_db();
    migrate(&db, 13);
    migrate(&db, 14);
    assert_table_exists(&db, "group");
    assert_table_exists(&db, "group_project_metadata");
    assert_table_exists(&db, "group_domain_metadata");
    assert_table_exists(&db, "user_group_membership");
}

#[test]
fn test_downgrade_14_to_13() {
    let db = new_db();
    migrate(&db, 14);
    migrate(&db, 13);
    assert_table_does_not_exist(&db, "group");
    assert_table_does_not_exist(&db, "group_project_metadata");
    assert_table_does_not_exist(&db, "group_domain_metadata");
    assert_table_does_not_exist(&db, "user_group_membership");
}

#[test]
fn test_upgrade_tenant_to_project() {
    let db = new_db();
    migrate(&db, 14);
    assert_tenant_tables(&db);
    migrate(&db, 15);
    assert_project_tables(&db);
    assert_table_columns(&db, "user_project_membership", &["user_id", "project_id"]);
    assert_table_columns(&db, "user_project_metadata", &["user_id", "project_id", "data"]);
    assert_table_columns(
        &db,
        "ec2_credential",
        &["access", "secret", "user_id", "project_id"],
    );
}

#[test]
fn test_downgrade_project_to_tenant() {
    let db = new_db();
    migrate(&db, 14);
    assert_tenant_tables(&db);
    migrate(&db, 15);
    assert_project_tables(&db);
    migrate(&db, 14);
    assert_tenant_tables(&db);
    assert_table_columns(&db, "user_tenant_membership", &["user_id", "tenant_id"]);
    assert_table_columns(&db, "metadata", &["user_id", "tenant_id", "data"]);
}

#[test]
fn test_tenant_rows_follow_rename() {
    let db = new_db();
    migrate(&db, 14);
    populate_tenant_table(&db, Columns::Normalized);
    db.execute_dml(
        "INSERT INTO user_tenant_membership (user_id, tenant_id) VALUES ('foo', 'bar')",
        &[],
    )
    .unwrap();

    migrate(&db, 15);
    assert_eq!(count(&db, "project"), 3);
    let rows = db
        .query("SELECT user_id, project_id FROM user_project_membership", &[])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].str(1).unwrap(), "bar");

    migrate(&db, 14);
    assert_eq!(count(&db, "tenant"), 3);
    assert_eq!(count(&db, "user_tenant_membership"), 1);
}

#[test]
fn test_upgrade_14_to_16() {
    let db = new_db();
    migrate(&db, 14);
    populate_user_table(&db, Columns::Normalized);
    populate_tenant_table(&db, Columns::Normalized);
    migrate(&db, 16);

    assert_table_columns(
        &db,
        "user",
        &["id", "name", "extra", "password", "enabled", "domain_id"],
    );
    let foo = select_by_id(&db, "user", "enabled, domain_id", "foo");
    assert_eq!(foo.opt_bool(0).unwrap(), Some(true));
    assert_eq!(foo.str(1).unwrap(), DEFAULT_DOMAIN_ID);

    let users = fixtures::users();
    let badguy = select_by_id(&db, "user", "name, domain_id", "badguy");
    assert_eq!(badguy.str(0).unwrap(), users[2]["name"]);
    assert_eq!(badguy.str(1).unwrap(), DEFAULT_DOMAIN_ID);

    let tenants = fixtures::tenants();
    let baz = select_by_id(&db, "project", "description, domain_id", "baz");
    assert_eq!(baz.str(0).unwrap(), tenants[1]["description"]);
    assert_eq!(baz.str(1).unwrap(), DEFAULT_DOMAIN_ID);
}

#[test]
fn test_downgrade_16_to_14() {
    let db = new_db();
    migrate(&db, 16);
    populate_user_table(&db, Columns::DomainScoped);
    populate_tenant_table(&db, Columns::DomainScoped);
    migrate(&db, 14);

    assert_table_columns(&db, "user", &["id", "name", "extra", "password", "enabled"]);
    let foo = select_by_id(&db, "user", "enabled", "foo");
    assert_eq!(foo.opt_bool(0).unwrap(), Some(true));

    let users = fixtures::users();
    let badguy = select_by_id(&db, "user", "name", "badguy");
    assert_eq!(badguy.str(0).unwrap(), users[2]["name"]);

    let tenants = fixtures::tenants();
    let baz = select_by_id(&db, "tenant", "description", "baz");
    assert_eq!(baz.str(0).unwrap(), tenants[1]["description"]);
}

// ── Planner boundaries ─────────────────────────────────────────────────

#[test]
fn test_invalid_targets_rejected() {
    let db = new_db();
    migrate(&db, 3);
    let migrator = migrator(&db);

    for target in [-1, i64::from(latest()) + 1] {
        let err = migrator.migrate(target).unwrap_err();
        assert!(
            matches!(err, MigrationError::InvalidTarget { current: 3, .. }),
            "{err:?}"
        );
    }
    assert_eq!(migrator.current_version().unwrap(), 3);
    assert_schema_at(&db, 3);
}

#[test]
fn test_migrating_to_current_is_a_noop() {
    let db = new_db();
    migrate(&db, 8);
    populate_user_table(&db, Columns::Legacy);

    assert_eq!(migrator(&db).migrate(8).unwrap(), 8);
    assert_eq!(count(&db, "user"), 3);
    assert_schema_at(&db, 8);
}

#[test]
fn test_database_ahead_of_repository() {
    let db = new_db();
    migrate(&db, 2);
    VersionTracker::new("identity").set_version(&db, 40).unwrap();

    let migrator = migrator(&db);
    assert_eq!(
        migrator.status().unwrap(),
        MigrationStatus::DatabaseAhead {
            current: 40,
            latest: latest()
        }
    );
    let err = migrator.migrate(2).unwrap_err();
    assert!(matches!(err, MigrationError::DatabaseAhead { current: 40, .. }));
}

#[test]
fn test_status_tracks_progress() {
    let db = new_db();
    let migrator = migrator(&db);
    assert_eq!(
        migrator.status().unwrap(),
        MigrationStatus::UpgradeAvailable {
            current: 0,
            latest: latest(),
            pending: latest() as usize
        }
    );
    migrator.upgrade_to_latest().unwrap();
    assert_eq!(
        migrator.status().unwrap(),
        MigrationStatus::UpToDate { version: latest() }
    );
}

#[test]
fn test_abort_stops_between_steps() {
    let db = new_db();
    let migrator = migrator(&db);
    migrator.migrate(4).unwrap();

    migrator
        .abort_handle()
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let err = migrator.upgrade_to_latest().unwrap_err();
    assert!(matches!(err, MigrationError::Aborted { reached: 4 }));
    assert_schema_at(&db, 4);
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn test_version_persists_across_connections() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("identity.duckdb");

    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        migrate(&db, 9);
        populate_user_table(&db, Columns::Normalized);
    }

    let db = DuckDbBackend::from_path(&path).unwrap();
    assert_eq!(migrator(&db).current_version().unwrap(), 9);
    assert_schema_at(&db, 9);
    migrate(&db, 16);
    assert_eq!(count(&db, "user"), 3);
}
