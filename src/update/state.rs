// ABOUTME: Update run state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid state transitions at compile time.

/// Initial state: run assembled from config, nothing persisted.
/// Available actions: `begin()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Prepared;

/// In progress: run document exists with status Pending.
/// Available actions: `apply_field()`, `complete()`, `abort()`
#[derive(Debug, Clone, Copy, Default)]
pub struct InProgress;

/// Completed: all updates applied, ledger persisted, status Completed.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;

/// Rolled back: backups restored, status Rolled Back.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct RolledBack;
