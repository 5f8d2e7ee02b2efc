// ABOUTME: Remote call transport dispatching procedures against a document store.
// ABOUTME: Implements the rollback_changes method for any DocumentOps backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::form::{Document, ROLLBACK_METHOD};
use crate::store::DocumentOps;
use crate::update::rollback_changes;

use super::transport::{CallError, CallResponse, RemoteCall};

/// Transport that executes named procedures directly against a store.
///
/// Used where the caller owns the backend connection itself (the CLI, or
/// tests over the in-memory store) instead of going through the host
/// framework's wire transport.
pub struct StoreTransport<D> {
    store: Arc<D>,
}

impl<D> StoreTransport<D> {
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<D: DocumentOps + 'static> RemoteCall for StoreTransport<D> {
    async fn call(&self, method: &str, doc: &Document) -> Result<CallResponse, CallError> {
        match method {
            ROLLBACK_METHOD => {
                let report = rollback_changes(self.store.as_ref(), &doc.name)
                    .await
                    .map_err(|e| CallError::Server(e.to_string()))?;
                Ok(CallResponse::with_message(Value::String(report.message())))
            }
            other => Err(CallError::UnknownMethod(other.to_string())),
        }
    }
}
