//! Error types for namelock.
//!
//! Uses thiserror for derive macros. Contention is not an error: `acquire`
//! reports it as `Ok(false)`.

use crate::exit_codes;
use std::io;
use thiserror::Error;

/// Main error type for namelock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// The caller passed a combination of arguments that makes no sense.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A non-reentrant lock was acquired again through the handle holding it.
    #[error("lock '{name}' is already held by this handle and is not reentrant")]
    ReentrancyViolation { name: String },

    /// `release` was called more times than `acquire` succeeded.
    #[error("lock '{name}' released more times than it was acquired")]
    Underflow { name: String },

    /// Filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Lock options could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A lock file exists but its holder record cannot be parsed.
    #[error("unreadable lock metadata: {0}")]
    Metadata(String),

    /// CLI usage error.
    #[error("{0}")]
    UserError(String),

    /// The lock was not obtained (CLI only; the library returns `Ok(false)`).
    #[error("could not acquire lock '{name}'")]
    NotAcquired { name: String },
}

impl LockError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        LockError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::InvalidArgument(_)
            | LockError::ReentrancyViolation { .. }
            | LockError::Underflow { .. }
            | LockError::Config(_)
            | LockError::UserError(_) => exit_codes::USER_ERROR,
            LockError::Io { .. } | LockError::Metadata(_) => exit_codes::IO_FAILURE,
            LockError::NotAcquired { .. } => exit_codes::NOT_ACQUIRED,
        }
    }
}

/// Result type alias for namelock operations.
pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_errors_are_user_errors() {
        let errs = [
            LockError::InvalidArgument("x".to_string()),
            LockError::ReentrancyViolation {
                name: "db".to_string(),
            },
            LockError::Underflow {
                name: "db".to_string(),
            },
            LockError::Config("bad yaml".to_string()),
        ];
        for err in errs {
            assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
        }
    }

    #[test]
    fn io_error_has_correct_exit_code() {
        let err = LockError::io(
            "failed to open lock file",
            io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
        assert_eq!(err.to_string(), "failed to open lock file: disk on fire");
    }

    #[test]
    fn metadata_error_is_not_reported_as_configuration() {
        let err = LockError::Metadata("bad json".to_string());
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
        assert_eq!(err.to_string(), "unreadable lock metadata: bad json");
    }

    #[test]
    fn not_acquired_has_correct_exit_code() {
        let err = LockError::NotAcquired {
            name: "deploy".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::NOT_ACQUIRED);
        assert_eq!(err.to_string(), "could not acquire lock 'deploy'");
    }

    #[test]
    fn error_messages_name_the_lock() {
        let err = LockError::ReentrancyViolation {
            name: "cache".to_string(),
        };
        assert!(err.to_string().contains("'cache'"));
        assert!(err.to_string().contains("not reentrant"));
    }
}
