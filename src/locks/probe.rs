//! Inspect a lock file without becoming its holder.

use super::backend::{Fs2Backend, LockBackend};
use super::metadata::LockMetadata;
use crate::error::{LockError, Result};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// What a lock path looks like from the outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockStatus {
    /// No lock file exists.
    Free,

    /// Some process holds the lock. The holder record is included when it
    /// could be read.
    Held { holder: Option<LockMetadata> },

    /// A lock file exists but nobody holds it.
    Orphaned,
}

impl LockStatus {
    pub fn is_held(&self) -> bool {
        matches!(self, LockStatus::Held { .. })
    }
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockStatus::Free => write!(f, "free"),
            LockStatus::Orphaned => write!(f, "free (orphaned lock file)"),
            LockStatus::Held { holder: None } => write!(f, "held (holder unknown)"),
            LockStatus::Held {
                holder: Some(meta),
            } => write!(
                f,
                "held by {} (pid {}, for {})",
                meta.owner,
                meta.pid,
                meta.age_string()
            ),
        }
    }
}

/// Probe `path` with the default backend.
pub fn probe(path: &Path) -> Result<LockStatus> {
    probe_with(&Fs2Backend, path)
}

/// Probe `path`.
///
/// An unheld file is locked for an instant while probing, so a concurrent
/// non-blocking acquirer can see contention.
pub fn probe_with<B: LockBackend>(backend: &B, path: &Path) -> Result<LockStatus> {
    // Never create the file: a probe must not leave artifacts behind.
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockStatus::Free),
        Err(e) => {
            return Err(LockError::io(
                format!("failed to open lock file '{}'", path.display()),
                e,
            ));
        }
    };

    let acquired = backend.try_lock_exclusive(&file).map_err(|e| {
        LockError::io(format!("failed to probe lock '{}'", path.display()), e)
    })?;

    if acquired {
        return Ok(LockStatus::Orphaned);
    }

    let holder = LockMetadata::from_file(path).ok();
    Ok(LockStatus::Held { holder })
}
