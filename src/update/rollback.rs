// ABOUTME: Rollback procedure restoring backed-up field values.
// ABOUTME: Walks the persisted ledger in reverse order, best effort per entry.

use serde_json::Value;

use crate::store::{DocumentError, DocumentOps};
use crate::types::{DocId, FieldName};

use super::backup::BackupLedger;
use super::error::UpdateError;
use super::run::{FIELD_BACKUP_DATA, FIELD_STATUS, RunStatus, run_doctype, run_field};

/// A backup entry that could not be restored.
#[derive(Debug, Clone)]
pub struct SkippedRestore {
    pub doc: DocId,
    pub field: FieldName,
    pub reason: String,
}

/// Outcome of a rollback: how many entries were restored and which were
/// skipped. The message is what the remote caller displays to the user.
#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    pub restored: usize,
    pub skipped: Vec<SkippedRestore>,
}

impl RollbackReport {
    pub fn message(&self) -> String {
        if self.skipped.is_empty() {
            format!("Rolled back {} records", self.restored)
        } else {
            format!(
                "Rolled back {} records ({} skipped)",
                self.restored,
                self.skipped.len()
            )
        }
    }
}

/// Rollback procedure invoked under the method name `rollback_changes`.
///
/// Loads the run document, restores its persisted ledger in reverse
/// order, and marks the run `Rolled Back`. Restores run with
/// `update_modified` off so timestamps are preserved where the backend
/// supports it.
///
/// # Errors
///
/// Returns error if:
/// - The run document does not exist
/// - The run carries no backup data (nothing was persisted)
/// - The ledger cannot be decoded
/// - The run's status cannot be updated afterwards
pub async fn rollback_changes<D: DocumentOps>(
    store: &D,
    run: &DocId,
) -> Result<RollbackReport, UpdateError> {
    let fields = store
        .get_document(&run_doctype(), run)
        .await
        .map_err(|e| match e {
            DocumentError::NotFound { .. } => UpdateError::RunNotFound(run.to_string()),
            other => UpdateError::RollbackFailed(other.to_string()),
        })?;

    let backup_json = fields
        .get(FIELD_BACKUP_DATA)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UpdateError::NoBackupData(run.to_string()))?;

    let ledger = BackupLedger::from_json(backup_json)?;

    tracing::info!(run = %run, entries = ledger.len(), "starting rollback");

    let report = restore_ledger(store, &ledger).await;

    store
        .set_value(
            &run_doctype(),
            run,
            &run_field(FIELD_STATUS),
            Value::String(RunStatus::RolledBack.as_str().to_string()),
            false,
        )
        .await
        .map_err(|e| UpdateError::RollbackFailed(format!("failed to update run status: {}", e)))?;

    tracing::info!(run = %run, restored = report.restored, "rollback complete");

    Ok(report)
}

/// Restore every ledger entry, most recent first.
///
/// A failed restore is logged and recorded as skipped; the loop continues
/// so one vanished document doesn't strand the rest of the data.
pub(crate) async fn restore_ledger<D: DocumentOps>(
    store: &D,
    ledger: &BackupLedger,
) -> RollbackReport {
    let mut report = RollbackReport::default();

    for entry in ledger.iter_rev() {
        match store
            .set_value(
                &entry.doctype,
                &entry.doc,
                &entry.field,
                entry.original.clone(),
                false,
            )
            .await
        {
            Ok(()) => {
                tracing::info!(doc = %entry.doc, field = %entry.field, "restored");
                report.restored += 1;
            }
            Err(e) => {
                tracing::error!(doc = %entry.doc, field = %entry.field, error = %e, "restore failed");
                report.skipped.push(SkippedRestore {
                    doc: entry.doc.clone(),
                    field: entry.field.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_message_counts_records() {
        let report = RollbackReport {
            restored: 3,
            skipped: vec![],
        };
        assert_eq!(report.message(), "Rolled back 3 records");
    }

    #[test]
    fn report_message_mentions_skipped() {
        let report = RollbackReport {
            restored: 2,
            skipped: vec![SkippedRestore {
                doc: DocId::new("CUST-0003"),
                field: FieldName::new("status").unwrap(),
                reason: "gone".to_string(),
            }],
        };
        assert_eq!(report.message(), "Rolled back 2 records (1 skipped)");
    }
}
