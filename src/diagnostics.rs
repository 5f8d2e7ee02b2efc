// ABOUTME: Diagnostics accumulator for non-fatal warnings during update runs.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

/// Collects non-fatal warnings during update operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during an update run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a lock release warning.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    /// Create a skipped-restore warning.
    pub fn restore_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RestoreSkipped,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during update runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed to release the run lock (lock file may remain).
    LockRelease,
    /// A backup entry could not be restored during rollback.
    RestoreSkipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::lock_release("failed to remove lock file"));
        diag.warn(Warning::restore_skipped("document vanished"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        let lock_warning = Warning::lock_release("test");
        assert_eq!(lock_warning.kind, WarningKind::LockRelease);

        let restore_warning = Warning::restore_skipped("test");
        assert_eq!(restore_warning.kind, WarningKind::RestoreSkipped);
    }
}
