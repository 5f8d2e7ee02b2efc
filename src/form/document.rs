// ABOUTME: Client-side document as handed to form hooks by the host framework.
// ABOUTME: Loosely-typed fields with typed identity, serializable for remote calls.

use crate::types::{DocId, DocTypeName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The in-memory document a form is editing.
///
/// Identity is typed; everything else is the backend's loose field map.
/// The form layer only ever reads fields, it never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doctype: DocTypeName,
    pub name: DocId,
    #[serde(flatten)]
    fields: serde_json::Map<String, Value>,
}

impl Document {
    pub fn new(doctype: DocTypeName, name: DocId) -> Self {
        Self {
            doctype,
            name,
            fields: serde_json::Map::new(),
        }
    }

    /// Build a document from a stored field map.
    ///
    /// Identity keys are stripped from the map so they can't shadow the
    /// typed identity on serialization.
    pub fn from_fields(
        doctype: DocTypeName,
        name: DocId,
        mut fields: serde_json::Map<String, Value>,
    ) -> Self {
        fields.remove("doctype");
        fields.remove("name");
        Self {
            doctype,
            name,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// The document's status field, when set to a string.
    pub fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &serde_json::Map<String, Value> {
        &self.fields
    }
}
