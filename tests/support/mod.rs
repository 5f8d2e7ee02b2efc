// ABOUTME: Shared helpers for integration tests.
// ABOUTME: Builds test configs and seeds in-memory stores.

#![allow(dead_code)]

use safeset::config::JobConfig;
use safeset::store::{DocFields, DocumentOps, MemoryStore};
use safeset::types::{DocId, DocTypeName, FieldName};
use serde_json::Value;

/// A job config targeting the given doctype, pointed at a server no test
/// ever reaches (the in-memory store stands in for it).
pub fn test_config(doctype: &str) -> JobConfig {
    JobConfig::from_yaml(&format!(
        r#"
doctype: {doctype}
updates:
  - field: customer_group
    value: Commercial
server:
  host: localhost
"#
    ))
    .unwrap()
}

pub fn doctype(name: &str) -> DocTypeName {
    DocTypeName::new(name).unwrap()
}

pub fn field(name: &str) -> FieldName {
    FieldName::new(name).unwrap()
}

/// Insert a document with the given fields.
pub async fn seed(store: &MemoryStore, dt: &str, name: &str, fields: &[(&str, Value)]) {
    let mut map = DocFields::new();
    for (k, v) in fields {
        map.insert(k.to_string(), v.clone());
    }
    store
        .insert_document(&doctype(dt), &DocId::new(name), map)
        .await
        .unwrap();
}

/// Read a single field value, unwrapping the document lookup.
pub async fn value_of(store: &MemoryStore, dt: &str, name: &str, field_name: &str) -> Option<Value> {
    store
        .get_value(&doctype(dt), &DocId::new(name), &field(field_name))
        .await
        .unwrap()
}
