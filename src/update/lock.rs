// ABOUTME: Run lock to prevent concurrent updates against the same doctype.
// ABOUTME: Uses atomic file creation with lock info stored in ~/.local/state/safeset/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::DocTypeName;

use super::error::UpdateError;

/// Base directory for safeset state files (XDG Base Directory compliant).
const STATE_DIR: &str = ".local/state/safeset";

/// Information about who holds a run lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Doctype being updated.
    pub doctype: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(doctype: &DocTypeName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            doctype: doctype.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }
}

/// Default lock directory under the user's home.
fn default_lock_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
}

/// A held run lock, released explicitly via `release`.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquire a run lock for the given doctype in the default state dir.
    pub fn acquire(doctype: &DocTypeName, force: bool) -> Result<Self, UpdateError> {
        Self::acquire_in(&default_lock_dir(), doctype, force)
    }

    /// Acquire a run lock in an explicit directory.
    ///
    /// Uses `create_new` for atomic lock acquisition (no TOCTOU race).
    /// Returns error if the lock is already held by another process.
    /// Auto-breaks stale locks (>1 hour) with a warning.
    pub fn acquire_in(dir: &Path, doctype: &DocTypeName, force: bool) -> Result<Self, UpdateError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| UpdateError::LockFailed(format!("failed to create state directory: {}", e)))?;

        let path = dir.join(format!("{}.lock", doctype.slug()));

        let lock_info = LockInfo::new(doctype);
        let lock_json = serde_json::to_string(&lock_info)
            .map_err(|e| UpdateError::LockFailed(format!("failed to serialize lock: {}", e)))?;

        match Self::try_create(&path, &lock_json) {
            Ok(()) => return Ok(Self { path }),
            Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                return Err(UpdateError::LockFailed(format!(
                    "failed to acquire lock: {}",
                    e
                )));
            }
            Err(_) => {}
        }

        // Lock acquisition failed - check if existing lock should be broken
        let should_break = Self::check_existing_lock(&path, force);

        if !should_break {
            // Lock is valid and held by someone else
            if let Ok(content) = std::fs::read_to_string(&path)
                && let Ok(existing) = serde_json::from_str::<LockInfo>(&content)
            {
                return Err(UpdateError::LockHeld {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            return Err(UpdateError::LockFailed(
                "lock held by another process".to_string(),
            ));
        }

        // Break the lock and retry
        tracing::debug!("Removing stale/forced lock at {}", path.display());
        let _ = std::fs::remove_file(&path);

        match Self::try_create(&path, &lock_json) {
            Ok(()) => Ok(Self { path }),
            Err(_) => Err(UpdateError::LockFailed(
                "lock acquired by another process during break".to_string(),
            )),
        }
    }

    fn try_create(path: &Path, json: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(json.as_bytes())
    }

    /// Check if an existing lock should be broken (stale, forced, or corrupted).
    fn check_existing_lock(path: &Path, force: bool) -> bool {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                // Can't read lock info - corrupted or gone, break it
                tracing::warn!("Lock info unreadable, breaking lock");
                return true;
            }
        };

        match serde_json::from_str::<LockInfo>(&content) {
            Ok(existing_lock) => {
                if force {
                    tracing::warn!(
                        "Breaking lock held by {} (pid {}) since {}",
                        existing_lock.holder,
                        existing_lock.pid,
                        existing_lock.started_at
                    );
                    true
                } else if existing_lock.is_stale() {
                    tracing::warn!(
                        "Auto-breaking stale lock held by {} (pid {}) since {}",
                        existing_lock.holder,
                        existing_lock.pid,
                        existing_lock.started_at
                    );
                    true
                } else {
                    // Lock is active and valid
                    false
                }
            }
            Err(_) => {
                // Lock info corrupted, break it
                tracing::warn!("Lock info corrupted, breaking lock");
                true
            }
        }
    }

    /// Path of the lock file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    pub fn release(self) -> Result<(), UpdateError> {
        std::fs::remove_file(&self.path)
            .map_err(|e| UpdateError::LockFailed(format!("failed to remove lock file: {}", e)))
    }
}
