//! The named lock: acquisition protocol, reentrancy, release.

use super::backend::{Fs2Backend, LockBackend};
use super::metadata::LockMetadata;
use super::options::LockOptions;
use crate::error::{LockError, Result};
use crate::naming::LockIdentity;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// A cross-process lock identified by name.
///
/// Every process constructing a `NamedLock` with the same name and directory
/// contends on the same advisory-locked file. One `NamedLock` belongs to one
/// logical owner; all state changes go through `&mut self`.
#[derive(Debug)]
pub struct NamedLock<B: LockBackend = Fs2Backend> {
    identity: LockIdentity,
    reentrant: bool,
    poll_interval: Duration,
    count: u32,
    /// Present iff `count > 0`.
    handle: Option<File>,
    backend: B,
}

impl NamedLock<Fs2Backend> {
    /// Create a lock for `name` with the default backend.
    pub fn new(name: &str, options: LockOptions) -> Result<Self> {
        Self::with_backend(name, options, Fs2Backend)
    }

    /// Create a lock for `name` with default options.
    pub fn open(name: &str) -> Result<Self> {
        Self::new(name, LockOptions::default())
    }
}

impl<B: LockBackend> NamedLock<B> {
    /// Create a lock for `name` that talks to the OS through `backend`.
    ///
    /// The lock directory is resolved here, once.
    pub fn with_backend(name: &str, options: LockOptions, backend: B) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            identity: LockIdentity::new(name, options.lock_directory.as_deref()),
            reentrant: options.reentrant,
            poll_interval: options.poll_interval,
            count: 0,
            handle: None,
            backend,
        })
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.identity.path
    }

    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    pub fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of outstanding acquisitions through this handle.
    pub fn depth(&self) -> u32 {
        self.count
    }

    /// Whether this handle currently holds the lock.
    pub fn locked(&self) -> bool {
        self.count > 0
    }

    /// Acquire the lock.
    ///
    /// * `blocking = true, timeout = None` waits as long as it takes.
    /// * `blocking = true, timeout = Some(t)` polls every `poll_interval`
    ///   until `t` has elapsed.
    /// * `blocking = false` makes a single attempt; a timeout is rejected.
    ///
    /// Returns `Ok(false)` when the lock could not be obtained; nothing
    /// changes in that case.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - non-blocking with a timeout (no I/O is done)
    /// * `ReentrancyViolation` - already held by this non-reentrant handle
    /// * `Io` - the lock file could not be created, opened, locked or inspected
    pub fn acquire(&mut self, blocking: bool, timeout: Option<Duration>) -> Result<bool> {
        if !blocking && timeout.is_some() {
            return Err(LockError::InvalidArgument(
                "a timeout cannot be combined with a non-blocking acquire".to_string(),
            ));
        }

        if self.count > 0 {
            if !self.reentrant {
                return Err(LockError::ReentrancyViolation {
                    name: self.identity.name.clone(),
                });
            }
            self.count += 1;
            trace!(name = %self.identity.name, depth = self.count, "reentrant acquire");
            return Ok(true);
        }

        // An unrepresentable deadline is as good as none.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            let file = self.open_lock_file()?;

            if !self.lock_file(&file, blocking, deadline)? {
                debug!(name = %self.identity.name, "lock not acquired");
                return Ok(false);
            }

            if self.is_current(&file)? {
                self.commit(file);
                return Ok(true);
            }

            // Another process removed (and maybe recreated) the file between
            // our open and our lock; the lock we hold protects nothing.
            drop(file);
            debug!(
                name = %self.identity.name,
                path = %self.identity.path.display(),
                "locked a stale lock file, retrying"
            );

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(false);
            }
        }
    }

    /// Single non-blocking attempt.
    pub fn try_acquire(&mut self) -> Result<bool> {
        self.acquire(false, None)
    }

    /// Wait at most `timeout` for the lock.
    pub fn acquire_timeout(&mut self, timeout: Duration) -> Result<bool> {
        self.acquire(true, Some(timeout))
    }

    /// Wait for the lock without a deadline.
    pub fn lock(&mut self) -> Result<()> {
        // Blocking without a deadline only returns once the lock is held.
        self.acquire(true, None).map(|_| ())
    }

    /// Undo one acquisition.
    ///
    /// The last release closes the handle, which drops the advisory lock, and
    /// removes the lock file (before closing where the platform allows it).
    /// Removal failing because the file is gone or not ours to delete is
    /// ignored.
    ///
    /// # Errors
    ///
    /// * `Underflow` - nothing to release
    /// * `Io` - the lock file could not be removed; the lock is released anyway
    pub fn release(&mut self) -> Result<()> {
        if self.count == 0 {
            return Err(LockError::Underflow {
                name: self.identity.name.clone(),
            });
        }

        self.count -= 1;
        if self.count > 0 {
            trace!(name = %self.identity.name, depth = self.count, "reentrant release");
            return Ok(());
        }

        let handle = self.handle.take();
        let removed = if self.backend.unlink_while_locked() {
            // Unlinking first means anyone who wins the lock on this file
            // after we close it finds the path gone and starts over.
            let removed = self.remove_lock_file();
            drop(handle);
            removed
        } else {
            drop(handle);
            self.remove_lock_file()
        };
        debug!(name = %self.identity.name, "lock released");

        removed
    }

    /// Release regardless of reentrancy depth. No-op when not held.
    pub fn force_release(&mut self) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }
        self.count = 1;
        self.release()
    }

    fn open_lock_file(&self) -> Result<File> {
        let path = &self.identity.path;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                LockError::io(
                    format!("failed to create lock directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LockError::io(format!("failed to open lock file '{}'", path.display()), e))
    }

    fn lock_file(&self, file: &File, blocking: bool, deadline: Option<Instant>) -> Result<bool> {
        if blocking && deadline.is_none() {
            self.backend
                .lock_exclusive(file)
                .map_err(|e| self.lock_io_error(e))?;
            return Ok(true);
        }

        loop {
            if self
                .backend
                .try_lock_exclusive(file)
                .map_err(|e| self.lock_io_error(e))?
            {
                return Ok(true);
            }

            let Some(deadline) = deadline else {
                return Ok(false);
            };

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }

            trace!(name = %self.identity.name, "lock contended, polling");
            thread::sleep((deadline - now).min(self.poll_interval));
        }
    }

    /// Whether the locked handle is still the file the path names.
    fn is_current(&self, file: &File) -> Result<bool> {
        let held = self
            .backend
            .handle_identity(file)
            .map_err(|e| self.lock_io_error(e))?;
        let on_disk = self
            .backend
            .path_identity(&self.identity.path)
            .map_err(|e| self.lock_io_error(e))?;

        Ok(on_disk == Some(held))
    }

    fn commit(&mut self, file: File) {
        if let Err(e) = write_metadata(&file, &LockMetadata::current(&self.identity.name)) {
            warn!(
                name = %self.identity.name,
                error = %e,
                "failed to record lock holder"
            );
        }

        self.handle = Some(file);
        self.count = 1;
        debug!(
            name = %self.identity.name,
            path = %self.identity.path.display(),
            "lock acquired"
        );
    }

    fn remove_lock_file(&self) -> Result<()> {
        let path = &self.identity.path;

        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                debug!(path = %path.display(), error = %e, "lock file not removed");
                Ok(())
            }
            Err(e) => Err(LockError::io(
                format!("failed to remove lock file '{}'", path.display()),
                e,
            )),
        }
    }

    fn lock_io_error(&self, e: io::Error) -> LockError {
        LockError::io(
            format!("failed to lock '{}'", self.identity.path.display()),
            e,
        )
    }
}

impl<B: LockBackend> Drop for NamedLock<B> {
    fn drop(&mut self) {
        if self.count > 0
            && let Err(e) = self.force_release()
        {
            warn!(name = %self.identity.name, error = %e, "failed to release lock on drop");
        }
    }
}

/// Replace the file contents with the holder record.
fn write_metadata(mut file: &File, metadata: &LockMetadata) -> io::Result<()> {
    let json = metadata.to_json().map_err(io::Error::other)?;
    file.set_len(0)?;
    file.write_all(json.as_bytes())?;
    file.flush()
}
