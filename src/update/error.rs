// ABOUTME: Error types for update run operations.
// ABOUTME: Covers backup, apply, persistence, rollback, and lock failures.

use chrono::{DateTime, Utc};

/// Errors that can occur during update run state transitions.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Reading the original value for backup failed.
    #[error("failed to back up original value: {0}")]
    BackupReadFailed(String),

    /// Writing the new value failed.
    #[error("failed to apply update: {0}")]
    ApplyFailed(String),

    /// Persisting the run document failed.
    #[error("failed to persist run document: {0}")]
    RunPersistFailed(String),

    /// Rollback failed.
    #[error("rollback failed: {0}")]
    RollbackFailed(String),

    /// The addressed run document does not exist.
    #[error("run not found: {0}")]
    RunNotFound(String),

    /// The run document carries no backup data to restore.
    #[error("run {0} has no backup data")]
    NoBackupData(String),

    /// Backup ledger (de)serialization failed.
    #[error("backup ledger encoding failed: {0}")]
    LedgerEncoding(String),

    /// Another process holds the run lock.
    #[error("update lock held by {holder} (pid {pid}) since {started_at}")]
    LockHeld {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    /// Lock acquisition or release failed.
    #[error("lock error: {0}")]
    LockFailed(String),
}
