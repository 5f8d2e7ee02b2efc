// ABOUTME: Rollback command implementation.
// ABOUTME: Dispatches the rollback_changes procedure against a recorded run.

use std::sync::Arc;

use safeset::config::JobConfig;
use safeset::error::{Error, Result};
use safeset::form::{Document, ROLLBACK_METHOD};
use safeset::output::Output;
use safeset::rpc::{RemoteCall, StoreTransport};
use safeset::store::{DocumentOps, RestStore, StoreError, StoreErrorKind};
use safeset::types::DocId;
use safeset::update::run_doctype;

/// Roll back a recorded run by name.
pub async fn rollback(config: JobConfig, run: String, mut output: Output) -> Result<()> {
    output.start_timer();

    let store = Arc::new(
        RestStore::new(&config.server, config.request_timeout)
            .map_err(|e| Error::Store(e.to_string()))?,
    );

    let run_id = DocId::new(run);
    output.progress(&format!("Fetching run {}...", run_id));

    let fields = match store.get_document(&run_doctype(), &run_id).await {
        Ok(fields) => fields,
        Err(e) => {
            let unified = StoreError::from(e);
            return Err(match unified.kind() {
                StoreErrorKind::NotFound => Error::Update(format!("run not found: {run_id}")),
                _ => Error::Store(unified.to_string()),
            });
        }
    };
    let doc = Document::from_fields(run_doctype(), run_id, fields);

    output.progress("Restoring backed-up values...");
    let transport = StoreTransport::new(store);
    let response = transport
        .call(ROLLBACK_METHOD, &doc)
        .await
        .map_err(|e| Error::Call(e.to_string()))?;

    match response.display_message() {
        Some(message) => output.success(&message),
        None => output.success("Rollback complete!"),
    }

    Ok(())
}
