// ABOUTME: Status command implementation.
// ABOUTME: Shows a recorded run's fields, or lists all recorded runs.

use safeset::config::JobConfig;
use safeset::error::{Error, Result};
use safeset::store::{DocFilters, DocumentOps, RestStore, StoreError, StoreErrorKind};
use safeset::types::DocId;
use safeset::update::{
    FIELD_ENDED_AT, FIELD_STARTED_AT, FIELD_STATUS, FIELD_TARGET_DOCTYPE, run_doctype,
};
use serde_json::Value;

/// Show one run's status, or list recorded runs when no name is given.
pub async fn status(config: JobConfig, run: Option<String>) -> Result<()> {
    let store = RestStore::new(&config.server, config.request_timeout)
        .map_err(|e| Error::Store(e.to_string()))?;

    match run {
        Some(name) => {
            let run_id = DocId::new(name);
            let fields = match store.get_document(&run_doctype(), &run_id).await {
                Ok(fields) => fields,
                Err(e) => {
                    let unified = StoreError::from(e);
                    return Err(match unified.kind() {
                        StoreErrorKind::NotFound => {
                            Error::Update(format!("run not found: {run_id}"))
                        }
                        _ => Error::Store(unified.to_string()),
                    });
                }
            };

            let text = |field: &str| {
                fields
                    .get(field)
                    .and_then(Value::as_str)
                    .unwrap_or("-")
                    .to_string()
            };

            println!("Run: {}", run_id);
            println!("Status: {}", text(FIELD_STATUS));
            println!("Target: {}", text(FIELD_TARGET_DOCTYPE));
            println!("Started: {}", text(FIELD_STARTED_AT));
            println!("Ended: {}", text(FIELD_ENDED_AT));
        }
        None => {
            let runs = store
                .list_documents(&run_doctype(), &DocFilters::all())
                .await
                .map_err(|e| Error::Store(e.to_string()))?;

            if runs.is_empty() {
                println!("No runs recorded");
            } else {
                for run in runs {
                    println!("{run}");
                }
            }
        }
    }

    Ok(())
}
