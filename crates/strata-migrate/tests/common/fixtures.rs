//! Identity fixtures loaded into the user and tenant/project tables.

use serde_json::{json, Value as Json};

pub const DEFAULT_DOMAIN_ID: &str = "default";

pub fn users() -> Vec<Json> {
    vec![
        json!({
            "id": "foo",
            "name": "FOO",
            "domain_id": DEFAULT_DOMAIN_ID,
            "password": "foo2",
            "tenants": ["bar"],
        }),
        json!({
            "id": "two",
            "name": "TWO",
            "domain_id": DEFAULT_DOMAIN_ID,
            "password": "two2",
            "email": "two@example.com",
            "enabled": true,
            "tenant_id": "baz",
            "tenants": ["baz"],
        }),
        json!({
            "id": "badguy",
            "name": "BadGuy",
            "domain_id": DEFAULT_DOMAIN_ID,
            "password": "bad",
            "email": "bad@guy.com",
            "enabled": false,
            "tenant_id": "baz",
            "tenants": ["baz"],
        }),
    ]
}

pub fn tenants() -> Vec<Json> {
    vec![
        json!({
            "id": "bar",
            "name": "BAR",
            "domain_id": DEFAULT_DOMAIN_ID,
        }),
        json!({
            "id": "baz",
            "name": "BAZ",
            "domain_id": DEFAULT_DOMAIN_ID,
            "description": "description",
            "enabled": true,
        }),
        json!({
            "id": "mtu",
            "name": "MTU",
            "domain_id": DEFAULT_DOMAIN_ID,
            "description": "description",
            "enabled": true,
        }),
    ]
}
