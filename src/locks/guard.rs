//! RAII guard for scoped acquisition.

use super::backend::LockBackend;
use super::engine::NamedLock;
use crate::error::Result;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Holds one acquisition of a [`NamedLock`] for the guard's lifetime.
///
/// When dropped, the acquisition is released. If that fails, a warning is
/// logged but no panic occurs.
#[derive(Debug)]
pub struct NamedLockGuard<'a, B: LockBackend> {
    lock: &'a mut NamedLock<B>,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, B: LockBackend> NamedLockGuard<'a, B> {
    pub(super) fn new(lock: &'a mut NamedLock<B>) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release the lock before the guard
    /// goes out of scope, and want to handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl<B: LockBackend> Deref for NamedLockGuard<'_, B> {
    type Target = NamedLock<B>;

    fn deref(&self) -> &Self::Target {
        self.lock
    }
}

// Reentrant locks can be taken again through the guard.
impl<B: LockBackend> DerefMut for NamedLockGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.lock
    }
}

impl<B: LockBackend> Drop for NamedLockGuard<'_, B> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release()
        {
            warn!(
                name = %self.lock.name(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}

impl<B: LockBackend> NamedLock<B> {
    /// Block until the lock is held and return a guard that releases it.
    pub fn guard(&mut self) -> Result<NamedLockGuard<'_, B>> {
        self.lock()?;
        Ok(NamedLockGuard::new(self))
    }

    /// Run `f` while holding the lock.
    ///
    /// The lock is released however `f` exits, including by panic.
    pub fn with_lock<T>(&mut self, f: impl FnOnce() -> T) -> Result<T> {
        let guard = self.guard()?;
        let value = f();
        guard.release()?;
        Ok(value)
    }
}
