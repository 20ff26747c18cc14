//! Named cross-process locks.
//!
//! # Lock Files
//!
//! A lock name maps to `<dir>/namelock-<sha256>.lock` (see [`crate::naming`]).
//! The file is opened by every contender and locked with an exclusive,
//! advisory, whole-file lock. Closing the file releases the lock.
//!
//! # Stale Files
//!
//! The last holder deletes the file on release. A contender that opened the
//! file before the deletion can still lock the now-unlinked inode; it detects
//! this by comparing the identity of its handle with what the path names and
//! starts over.
//!
//! # Holder Metadata
//!
//! After acquiring, the holder writes JSON metadata into the file:
//! - `name`: The logical lock name
//! - `owner`: `user@HOST`
//! - `pid`: The process ID
//! - `acquired_at`: RFC3339 timestamp
//!
//! # RAII Guards
//!
//! [`NamedLock::guard`] returns a guard that releases on drop, and
//! [`NamedLock::with_lock`] runs a closure under the lock.

mod backend;
mod engine;
mod guard;
mod metadata;
mod options;
mod probe;


// Re-export public API
pub use backend::{FileIdentity, Fs2Backend, LockBackend};
pub use engine::NamedLock;
pub use guard::NamedLockGuard;
pub use metadata::LockMetadata;
pub use options::{DEFAULT_POLL_INTERVAL, LockOptions, timeout_from_millis};
pub use probe::{LockStatus, probe, probe_with};
