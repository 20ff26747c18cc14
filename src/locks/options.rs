//! Construction options for [`NamedLock`](super::NamedLock).
//!
//! Options can be built in code or loaded from a small YAML file:
//!
//! ```yaml
//! poll_interval_ms: 50
//! reentrant: true
//! lock_directory: /run/myapp/locks
//! ```
//!
//! Unknown fields are ignored.

use crate::error::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default delay between non-blocking attempts of a timed acquisition.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Options fixed at lock construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Sleep between retries while waiting with a timeout.
    #[serde(rename = "poll_interval_ms", with = "duration_millis")]
    pub poll_interval: Duration,

    /// Whether the same handle may acquire the lock again while holding it.
    pub reentrant: bool,

    /// Directory for the lock file; the platform temp directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_directory: Option<PathBuf>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reentrant: false,
            lock_directory: None,
        }
    }
}

impl LockOptions {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_reentrant(mut self, reentrant: bool) -> Self {
        self.reentrant = reentrant;
        self
    }

    pub fn with_lock_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_directory = Some(dir.into());
        self
    }

    /// Load options from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Config(format!(
                "failed to read options file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse options from a YAML string and validate them.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let options: LockOptions = serde_yaml::from_str(yaml)
            .map_err(|e| LockError::Config(format!("failed to parse options YAML: {}", e)))?;

        options.validate()?;
        Ok(options)
    }

    /// Serialize options to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LockError::Config(format!("failed to serialize options: {}", e)))
    }

    /// Reject values the lock engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(LockError::InvalidArgument(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Convert a signed millisecond timeout into an optional duration.
///
/// Negative values mean "no timeout".
pub fn timeout_from_millis(millis: i64) -> Option<Duration> {
    u64::try_from(millis).ok().map(Duration::from_millis)
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LockOptions::default();
        assert_eq!(options.poll_interval, Duration::from_millis(100));
        assert!(!options.reentrant);
        assert!(options.lock_directory.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = "poll_interval_ms: 25\nreentrant: true\nlock_directory: /run/locks\n";
        let options = LockOptions::from_yaml(yaml).unwrap();
        assert_eq!(options.poll_interval, Duration::from_millis(25));
        assert!(options.reentrant);
        assert_eq!(options.lock_directory, Some(PathBuf::from("/run/locks")));
    }

    #[test]
    fn test_from_yaml_partial_uses_defaults_and_ignores_unknown() {
        let options = LockOptions::from_yaml("reentrant: true\nfuture_knob: 3\n").unwrap();
        assert!(options.reentrant);
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = LockOptions::from_yaml("poll_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, LockError::InvalidArgument(_)));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = LockOptions::from_yaml("poll_interval_ms: [not a number").unwrap_err();
        assert!(matches!(err, LockError::Config(_)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let options = LockOptions::default()
            .with_poll_interval(Duration::from_millis(250))
            .with_lock_directory("/var/tmp/locks");
        let parsed = LockOptions::from_yaml(&options.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LockOptions::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to read options file"));
    }

    #[test]
    fn test_timeout_from_millis() {
        assert_eq!(timeout_from_millis(-1), None);
        assert_eq!(timeout_from_millis(0), Some(Duration::ZERO));
        assert_eq!(timeout_from_millis(1500), Some(Duration::from_millis(1500)));
    }
}
