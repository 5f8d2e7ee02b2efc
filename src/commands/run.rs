// ABOUTME: Run command implementation.
// ABOUTME: Executes the configured update run with backup and automatic rollback.

use safeset::config::JobConfig;
use safeset::diagnostics::{Diagnostics, Warning};
use safeset::error::{Error, Result};
use safeset::output::Output;
use safeset::store::{DocFilters, DocumentOps, RestStore};
use safeset::types::DocId;
use safeset::update::{InProgress, RunLock, UpdateError, UpdateRun};

/// Execute the configured update against all matching documents.
pub async fn run(config: JobConfig, mut output: Output, force: bool) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let lock =
        RunLock::acquire(&config.doctype, force).map_err(|e| Error::Update(e.to_string()))?;

    let result = run_locked(&config, &output, &mut diag).await;

    // The lock is released whatever happened; a leftover lock only blocks
    // future runs.
    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(format!(
            "failed to release run lock: {e}"
        )));
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let summary = result?;
    output.success(&format!(
        "Updated {} field(s) across {} document(s), recorded as {}",
        summary.fields, summary.docs, summary.run
    ));
    Ok(())
}

struct RunSummary {
    docs: usize,
    fields: usize,
    run: DocId,
}

async fn run_locked(
    config: &JobConfig,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<RunSummary> {
    output.progress(&format!(
        "Connecting to {}:{}...",
        config.server.host, config.server.port
    ));
    let store = RestStore::new(&config.server, config.request_timeout)
        .map_err(|e| Error::Store(e.to_string()))?;
    store.ping().await.map_err(|e| Error::Store(e.to_string()))?;

    let filters = DocFilters {
        equals: config.filters.clone(),
        limit: None,
    };
    let docs = store
        .list_documents(&config.doctype, &filters)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

    if docs.is_empty() {
        return Err(Error::NoDocuments);
    }

    output.progress(&format!(
        "Updating {} {} document(s)...",
        docs.len(),
        config.doctype
    ));

    let run = UpdateRun::new(config.clone());
    let mut run = run
        .begin(&store)
        .await
        .map_err(|e| Error::Update(e.to_string()))?;

    if let Err(e) = apply_all(&mut run, &store, config, &docs).await {
        output.progress("Update failed, rolling back...");
        return abort_run(run, &store, diag, e).await;
    }

    let fields = run.ledger().len();
    match run.complete(&store).await {
        Ok(completed) => Ok(RunSummary {
            docs: docs.len(),
            fields,
            run: completed.doc_id(),
        }),
        Err((run, e)) => {
            output.progress("Failed to record run, rolling back...");
            abort_run(run, &store, diag, e).await
        }
    }
}

/// Apply every configured field update to every matching document.
async fn apply_all<D: DocumentOps>(
    run: &mut UpdateRun<InProgress>,
    store: &D,
    config: &JobConfig,
    docs: &[DocId],
) -> std::result::Result<(), UpdateError> {
    for doc in docs {
        for update in config.updates.iter() {
            run.apply_field(store, doc, &update.field, &update.value)
                .await?;
        }
    }
    Ok(())
}

/// Abort the run, collect skipped-restore warnings, and surface the cause.
async fn abort_run<D: DocumentOps>(
    run: UpdateRun<InProgress>,
    store: &D,
    diag: &mut Diagnostics,
    cause: UpdateError,
) -> Result<RunSummary> {
    match run.abort(store).await {
        Ok((rolled_back, report)) => {
            for skipped in &report.skipped {
                diag.warn(Warning::restore_skipped(format!(
                    "could not restore {} {}: {}",
                    skipped.doc, skipped.field, skipped.reason
                )));
            }
            let _ = rolled_back.finish();
            Err(Error::Update(cause.to_string()))
        }
        Err(rollback_err) => Err(Error::Update(format!(
            "{cause}; rollback also failed: {rollback_err}"
        ))),
    }
}
