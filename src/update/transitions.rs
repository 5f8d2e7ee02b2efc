// ABOUTME: State transition methods for update run orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::marker::PhantomData;

use serde_json::Value;

use crate::store::{DocFields, DocumentOps};
use crate::types::{DocId, FieldName, RunId};

use super::backup::FieldBackup;
use super::error::UpdateError;
use super::rollback::{RollbackReport, restore_ledger};
use super::run::{
    FIELD_BACKUP_DATA, FIELD_ENDED_AT, FIELD_STARTED_AT, FIELD_STATUS, FIELD_TARGET_DOCTYPE,
    RunStatus, UpdateRun, run_doctype, run_field,
};
use super::state::{Completed, InProgress, Prepared, RolledBack};

/// Result type for transitions that may need rollback on failure.
pub type TransitionResult<T, S> = Result<UpdateRun<T>, (UpdateRun<S>, UpdateError)>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> UpdateRun<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self) -> UpdateRun<T> {
        UpdateRun {
            config: self.config,
            run_id: self.run_id,
            ledger: self.ledger,
            started_at: self.started_at,
            _state: PhantomData,
        }
    }

    /// Persist the terminal fields of the run document.
    async fn persist_outcome<D: DocumentOps>(
        &self,
        store: &D,
        status: RunStatus,
        ledger_json: String,
    ) -> Result<(), UpdateError> {
        let run = self.doc_id();
        let doctype = run_doctype();

        let writes = [
            (FIELD_BACKUP_DATA, Value::String(ledger_json)),
            (
                FIELD_ENDED_AT,
                Value::String(chrono::Utc::now().to_rfc3339()),
            ),
            (FIELD_STATUS, Value::String(status.as_str().to_string())),
        ];

        for (field, value) in writes {
            store
                .set_value(&doctype, &run, &run_field(field), value, false)
                .await
                .map_err(|e| UpdateError::RunPersistFailed(format!("{}: {}", field, e)))?;
        }

        Ok(())
    }
}

// =============================================================================
// Prepared -> InProgress
// =============================================================================

impl UpdateRun<Prepared> {
    /// Create the run document with status Pending.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::RunPersistFailed` if the run document cannot
    /// be created.
    #[must_use = "run state must be used"]
    pub async fn begin<D: DocumentOps>(
        self,
        store: &D,
    ) -> Result<UpdateRun<InProgress>, UpdateError> {
        let mut fields = DocFields::new();
        fields.insert(
            FIELD_STATUS.to_string(),
            Value::String(RunStatus::Pending.as_str().to_string()),
        );
        fields.insert(
            FIELD_TARGET_DOCTYPE.to_string(),
            Value::String(self.config.doctype.to_string()),
        );
        fields.insert(
            FIELD_STARTED_AT.to_string(),
            Value::String(self.started_at.to_rfc3339()),
        );

        store
            .insert_document(&run_doctype(), &self.doc_id(), fields)
            .await
            .map_err(|e| UpdateError::RunPersistFailed(e.to_string()))?;

        tracing::info!(run = %self.run_id, target = %self.config.doctype, "run started");

        Ok(self.transition())
    }
}

// =============================================================================
// InProgress: apply, then complete or abort
// =============================================================================

impl UpdateRun<InProgress> {
    /// Back up the current value of a field, then write the new one.
    ///
    /// The backup strictly precedes the write, so an apply failure leaves
    /// the ledger one entry ahead at worst — restoring it rewrites the
    /// still-original value, which is harmless.
    ///
    /// # Errors
    ///
    /// Returns error if the original cannot be read or the write fails.
    pub async fn apply_field<D: DocumentOps>(
        &mut self,
        store: &D,
        doc: &DocId,
        field: &FieldName,
        value: &Value,
    ) -> Result<(), UpdateError> {
        let original = store
            .get_value(&self.config.doctype, doc, field)
            .await
            .map_err(|e| UpdateError::BackupReadFailed(format!("{} {}: {}", doc, field, e)))?;

        self.ledger.push(FieldBackup {
            doctype: self.config.doctype.clone(),
            doc: doc.clone(),
            field: field.clone(),
            original: original.unwrap_or(Value::Null),
        });

        store
            .set_value(
                &self.config.doctype,
                doc,
                field,
                value.clone(),
                self.config.update_modified,
            )
            .await
            .map_err(|e| UpdateError::ApplyFailed(format!("{} {}: {}", doc, field, e)))?;

        tracing::info!(doc = %doc, field = %field, "updated");

        Ok(())
    }

    /// Persist the ledger and mark the run Completed.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` on failure to allow `abort`.
    #[must_use = "run state must be used"]
    pub async fn complete<D: DocumentOps>(self, store: &D) -> TransitionResult<Completed, InProgress> {
        let ledger_json = match self.ledger.to_json() {
            Ok(json) => json,
            Err(e) => return Err((self, e)),
        };

        if let Err(e) = self
            .persist_outcome(store, RunStatus::Completed, ledger_json)
            .await
        {
            return Err((self, e));
        }

        tracing::info!(run = %self.run_id, backups = self.ledger.len(), "run completed");

        Ok(self.transition())
    }

    /// Restore every backup taken so far and mark the run Rolled Back.
    ///
    /// Restoration works from the in-memory ledger, so it covers updates
    /// applied before any persistence happened. The ledger is persisted
    /// afterwards for audit.
    ///
    /// # Errors
    ///
    /// Returns error if the run document cannot be updated; individual
    /// restore failures are reported, not fatal.
    #[must_use = "run state must be used"]
    pub async fn abort<D: DocumentOps>(
        self,
        store: &D,
    ) -> Result<(UpdateRun<RolledBack>, RollbackReport), UpdateError> {
        tracing::warn!(run = %self.run_id, backups = self.ledger.len(), "aborting run, restoring backups");

        let report = restore_ledger(store, &self.ledger).await;

        let ledger_json = self.ledger.to_json()?;
        self.persist_outcome(store, RunStatus::RolledBack, ledger_json)
            .await?;

        Ok((self.transition(), report))
    }
}

// =============================================================================
// Terminal States
// =============================================================================

impl UpdateRun<Completed> {
    /// Consume the run and return its name.
    pub fn finish(self) -> RunId {
        self.run_id
    }
}

impl UpdateRun<RolledBack> {
    /// Consume the run and return its name.
    pub fn finish(self) -> RunId {
        self.run_id
    }
}
