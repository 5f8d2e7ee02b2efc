// ABOUTME: Update run struct parameterized by state marker, plus run document schema.
// ABOUTME: Run documents live in the store like any other document.

use chrono::{DateTime, Utc};
use std::marker::PhantomData;

use crate::config::JobConfig;
use crate::types::{DocId, DocTypeName, FieldName, RunId};

use super::backup::BackupLedger;
use super::state::Prepared;

/// Doctype under which run documents are stored.
pub const RUN_DOCTYPE: &str = "Data Update Run";

/// Field names of the run document.
pub const FIELD_STATUS: &str = "status";
pub const FIELD_TARGET_DOCTYPE: &str = "target_doctype";
pub const FIELD_BACKUP_DATA: &str = "backup_data";
pub const FIELD_STARTED_AT: &str = "started_at";
pub const FIELD_ENDED_AT: &str = "ended_at";

/// The run doctype as a validated name.
pub fn run_doctype() -> DocTypeName {
    DocTypeName::new(RUN_DOCTYPE).expect("run doctype name is valid")
}

/// A run document field as a validated name.
pub(crate) fn run_field(name: &'static str) -> FieldName {
    FieldName::new(name).expect("run field name is valid")
}

/// Lifecycle status stored in the run document's status field.
///
/// The rollback form action is offered only for `Completed` runs, keyed on
/// the exact status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Completed,
    RolledBack,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "Pending",
            RunStatus::Completed => "Completed",
            RunStatus::RolledBack => "Rolled Back",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RunStatus::Pending),
            "Completed" => Some(RunStatus::Completed),
            "Rolled Back" => Some(RunStatus::RolledBack),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An update run in progress, parameterized by its current state.
///
/// The state type parameter `S` restricts which operations are available,
/// so a run that was never begun cannot be completed, and a completed run
/// cannot apply further updates.
#[derive(Debug)]
pub struct UpdateRun<S> {
    pub(crate) config: JobConfig,
    pub(crate) run_id: RunId,
    pub(crate) ledger: BackupLedger,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) _state: PhantomData<S>,
}

impl UpdateRun<Prepared> {
    /// Create a new run with a generated run name.
    pub fn new(config: JobConfig) -> Self {
        let run_id = generate_run_id(&config.doctype);
        Self::with_id(config, run_id)
    }

    /// Create a new run with an explicit run name.
    pub fn with_id(config: JobConfig, run_id: RunId) -> Self {
        UpdateRun {
            config,
            run_id,
            ledger: BackupLedger::new(),
            started_at: Utc::now(),
            _state: PhantomData,
        }
    }
}

impl<S> UpdateRun<S> {
    /// Get the run name.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Get the target doctype from config.
    pub fn target(&self) -> &DocTypeName {
        &self.config.doctype
    }

    /// Get the backup ledger accumulated so far.
    pub fn ledger(&self) -> &BackupLedger {
        &self.ledger
    }

    /// The run's own document name in the store.
    pub fn doc_id(&self) -> DocId {
        DocId::new(self.run_id.to_string())
    }
}

/// Generate a run name from the target doctype, a UTC timestamp, and the
/// process id. Uniqueness holds for one run per doctype per process per
/// second, which the run lock already enforces.
fn generate_run_id(doctype: &DocTypeName) -> RunId {
    RunId::new(format!(
        "{}-{}-{}",
        doctype.slug(),
        Utc::now().format("%Y%m%d%H%M%S"),
        std::process::id(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_are_exact() {
        assert_eq!(RunStatus::Pending.as_str(), "Pending");
        assert_eq!(RunStatus::Completed.as_str(), "Completed");
        assert_eq!(RunStatus::RolledBack.as_str(), "Rolled Back");
    }

    #[test]
    fn status_parse_round_trips() {
        for status in [RunStatus::Pending, RunStatus::Completed, RunStatus::RolledBack] {
            assert_eq!(RunStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RunStatus::parse("Rolled back"), None);
    }

    #[test]
    fn generated_run_id_starts_with_doctype_slug() {
        let id = generate_run_id(&DocTypeName::new("Sales Invoice").unwrap());
        assert!(id.as_str().starts_with("sales-invoice-"));
    }
}
