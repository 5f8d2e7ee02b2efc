// ABOUTME: Update run orchestration using the type state pattern.
// ABOUTME: Exports state markers, the run struct, ledger, lock, and rollback.

mod backup;
mod error;
mod lock;
mod rollback;
mod run;
mod state;
mod transitions;

pub use backup::{BackupLedger, FieldBackup};
pub use error::UpdateError;
pub use lock::{LockInfo, RunLock};
pub use rollback::{RollbackReport, SkippedRestore, rollback_changes};
pub use run::{
    FIELD_BACKUP_DATA, FIELD_ENDED_AT, FIELD_STARTED_AT, FIELD_STATUS, FIELD_TARGET_DOCTYPE,
    RUN_DOCTYPE, RunStatus, UpdateRun, run_doctype,
};
pub use state::{Completed, InProgress, Prepared, RolledBack};
pub use transitions::TransitionResult;
