// ABOUTME: In-memory document store implementation.
// ABOUTME: Backs tests and embedders that manage documents locally.

use super::traits::sealed::Sealed;
use super::traits::{DocFields, DocFilters, DocumentError, DocumentOps};
use crate::types::{DocId, DocTypeName, FieldName};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Document store backed by a process-local map.
///
/// Documents are keyed by `(doctype, name)`. The `modified` field is
/// touched on writes with `update_modified` set, mirroring the backend's
/// timestamp behavior.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(String, String), DocFields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across all doctypes.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn key(doctype: &DocTypeName, name: &DocId) -> (String, String) {
        (doctype.to_string(), name.to_string())
    }
}

impl Sealed for MemoryStore {}

#[async_trait]
impl DocumentOps for MemoryStore {
    async fn get_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
    ) -> Result<Option<Value>, DocumentError> {
        let docs = self.docs.read();
        let fields = docs
            .get(&Self::key(doctype, name))
            .ok_or_else(|| DocumentError::not_found(doctype, name))?;
        Ok(fields.get(field.as_str()).cloned())
    }

    async fn set_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
        value: Value,
        update_modified: bool,
    ) -> Result<(), DocumentError> {
        let mut docs = self.docs.write();
        let fields = docs
            .get_mut(&Self::key(doctype, name))
            .ok_or_else(|| DocumentError::not_found(doctype, name))?;
        fields.insert(field.as_str().to_string(), value);
        if update_modified {
            fields.insert(
                "modified".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(())
    }

    async fn insert_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        fields: DocFields,
    ) -> Result<(), DocumentError> {
        let mut docs = self.docs.write();
        let key = Self::key(doctype, name);
        if docs.contains_key(&key) {
            return Err(DocumentError::already_exists(doctype, name));
        }
        docs.insert(key, fields);
        Ok(())
    }

    async fn get_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
    ) -> Result<DocFields, DocumentError> {
        let docs = self.docs.read();
        docs.get(&Self::key(doctype, name))
            .cloned()
            .ok_or_else(|| DocumentError::not_found(doctype, name))
    }

    async fn list_documents(
        &self,
        doctype: &DocTypeName,
        filters: &DocFilters,
    ) -> Result<Vec<DocId>, DocumentError> {
        let docs = self.docs.read();
        let mut names: Vec<String> = docs
            .iter()
            .filter(|((dt, _), fields)| dt == doctype.as_str() && filters.matches(fields))
            .map(|((_, name), _)| name.clone())
            .collect();
        // Map iteration order is arbitrary; keep listings deterministic.
        names.sort();
        if let Some(limit) = filters.limit {
            names.truncate(limit);
        }
        Ok(names.into_iter().map(DocId::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype() -> DocTypeName {
        DocTypeName::new("Customer").unwrap()
    }

    fn field(name: &str) -> FieldName {
        FieldName::new(name).unwrap()
    }

    fn seed(store: &MemoryStore, name: &str, fields: &[(&str, Value)]) {
        let mut map = DocFields::new();
        for (k, v) in fields {
            map.insert(k.to_string(), v.clone());
        }
        store
            .docs
            .write()
            .insert((doctype().to_string(), name.to_string()), map);
    }

    #[tokio::test]
    async fn get_value_of_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .get_value(&doctype(), &DocId::new("CUST-0001"), &field("status"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_value_of_unset_field_is_none() {
        let store = MemoryStore::new();
        seed(&store, "CUST-0001", &[("status", Value::String("Open".into()))]);
        let value = store
            .get_value(&doctype(), &DocId::new("CUST-0001"), &field("territory"))
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn set_value_touches_modified_only_when_asked() {
        let store = MemoryStore::new();
        seed(&store, "CUST-0001", &[]);
        let name = DocId::new("CUST-0001");

        store
            .set_value(&doctype(), &name, &field("status"), "Open".into(), false)
            .await
            .unwrap();
        assert!(
            !store
                .get_document(&doctype(), &name)
                .await
                .unwrap()
                .contains_key("modified")
        );

        store
            .set_value(&doctype(), &name, &field("status"), "Closed".into(), true)
            .await
            .unwrap();
        assert!(
            store
                .get_document(&doctype(), &name)
                .await
                .unwrap()
                .contains_key("modified")
        );
    }

    #[tokio::test]
    async fn list_documents_filters_and_sorts() {
        let store = MemoryStore::new();
        seed(&store, "CUST-0002", &[("disabled", Value::from(0))]);
        seed(&store, "CUST-0001", &[("disabled", Value::from(0))]);
        seed(&store, "CUST-0003", &[("disabled", Value::from(1))]);

        let mut filters = DocFilters::all();
        filters.equals.insert("disabled".to_string(), Value::from(0));

        let names = store.list_documents(&doctype(), &filters).await.unwrap();
        assert_eq!(
            names,
            vec![DocId::new("CUST-0001"), DocId::new("CUST-0002")]
        );
    }

    #[tokio::test]
    async fn insert_rejects_duplicates() {
        let store = MemoryStore::new();
        let name = DocId::new("CUST-0001");
        store
            .insert_document(&doctype(), &name, DocFields::new())
            .await
            .unwrap();
        let err = store
            .insert_document(&doctype(), &name, DocFields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists { .. }));
    }
}
