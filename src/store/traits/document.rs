// ABOUTME: Document operations trait for backend document stores.
// ABOUTME: Read, write, insert, fetch, and list documents by doctype.

use super::sealed::Sealed;
use crate::types::{DocId, DocTypeName, FieldName};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// The loosely-typed field map of a stored document.
pub type DocFields = serde_json::Map<String, Value>;

/// Document access operations.
#[async_trait]
pub trait DocumentOps: Sealed + Send + Sync {
    /// Read a single field value.
    ///
    /// Returns `Ok(None)` when the document exists but the field is unset;
    /// an absent document is an error.
    async fn get_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
    ) -> Result<Option<Value>, DocumentError>;

    /// Write a single field value.
    ///
    /// `update_modified` controls whether the backend's modified timestamp
    /// is touched by the write.
    async fn set_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
        value: Value,
        update_modified: bool,
    ) -> Result<(), DocumentError>;

    /// Create a document with the given name and fields.
    async fn insert_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        fields: DocFields,
    ) -> Result<(), DocumentError>;

    /// Fetch all fields of a document.
    async fn get_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
    ) -> Result<DocFields, DocumentError>;

    /// List document names matching the given filters.
    async fn list_documents(
        &self,
        doctype: &DocTypeName,
        filters: &DocFilters,
    ) -> Result<Vec<DocId>, DocumentError>;
}

/// Filters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocFilters {
    /// Field equality filters (field name -> required value).
    pub equals: HashMap<String, Value>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl DocFilters {
    /// Filters matching every document of a doctype.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the given field map satisfies every equality filter.
    pub fn matches(&self, fields: &DocFields) -> bool {
        self.equals
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }
}

/// Errors from document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document not found: {doctype} {name}")]
    NotFound { doctype: String, name: String },

    #[error("document already exists: {doctype} {name}")]
    AlreadyExists { doctype: String, name: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl DocumentError {
    pub(crate) fn not_found(doctype: &DocTypeName, name: &DocId) -> Self {
        DocumentError::NotFound {
            doctype: doctype.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn already_exists(doctype: &DocTypeName, name: &DocId) -> Self {
        DocumentError::AlreadyExists {
            doctype: doctype.to_string(),
            name: name.to_string(),
        }
    }
}
