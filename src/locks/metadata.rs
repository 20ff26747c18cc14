//! Holder metadata written into a lock file once it is held.
//!
//! Purely diagnostic: nothing in the acquisition protocol reads it back.

use crate::error::{LockError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Who holds a lock and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// The logical lock name.
    pub name: String,

    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder.
    pub pid: u32,

    /// When the lock was acquired (RFC3339).
    pub acquired_at: DateTime<Utc>,
}

impl LockMetadata {
    /// Metadata for the current process, stamped now.
    pub fn current(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: get_owner_string(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    /// Parse metadata from a lock file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LockError::io(format!("failed to read lock file '{}'", path.display()), e)
        })?;

        Self::from_json(&content).map_err(|e| {
            LockError::Metadata(format!(
                "failed to parse lock file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// How long the lock has been held.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.acquired_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();

        if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds.max(0))
        }
    }
}

/// Get the owner string for lock metadata.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("held.lock");
        let meta = LockMetadata::current("held");
        fs::write(&path, meta.to_json().unwrap()).unwrap();

        assert_eq!(LockMetadata::from_file(&path).unwrap(), meta);
    }

    #[test]
    fn test_garbage_lock_file_is_a_metadata_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.lock");
        fs::write(&path, "not json").unwrap();

        let err = LockMetadata::from_file(&path).unwrap_err();
        assert!(matches!(err, LockError::Metadata(_)), "{err}");
        assert!(err.to_string().contains("garbage.lock"));
    }

    #[test]
    fn test_missing_lock_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = LockMetadata::from_file(dir.path().join("absent.lock")).unwrap_err();
        assert!(matches!(err, LockError::Io { .. }));
    }

    #[test]
    fn test_age_string_for_fresh_lock() {
        let meta = LockMetadata::current("fresh");
        assert!(meta.age_string().ends_with('s'));
    }
}
