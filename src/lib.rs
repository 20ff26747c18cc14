//! Namelock: named cross-process mutual exclusion on top of advisory file locks.
//!
//! A lock name is hashed into a file path under a lock directory (the
//! platform temp directory by default). Processes that use the same name
//! contend on an exclusive advisory lock over that file.
//!
//! ```no_run
//! use namelock::{LockOptions, NamedLock};
//! use std::time::Duration;
//!
//! let mut lock = NamedLock::new("nightly-report", LockOptions::default())?;
//! if lock.acquire(true, Some(Duration::from_secs(10)))? {
//!     // ... exclusive work ...
//!     lock.release()?;
//! }
//!
//! let value = lock.with_lock(|| 42)?;
//! assert_eq!(value, 42);
//! # Ok::<(), namelock::error::LockError>(())
//! ```

pub mod error;
pub mod exit_codes;
pub mod locks;
pub mod naming;

pub use error::{LockError, Result};
pub use locks::{
    FileIdentity, Fs2Backend, LockBackend, LockMetadata, LockOptions, LockStatus, NamedLock,
    NamedLockGuard, probe,
};
pub use naming::{LockIdentity, resolve_lock_path};
