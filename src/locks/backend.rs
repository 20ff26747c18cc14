//! Advisory lock primitive behind a small capability trait.
//!
//! The acquisition protocol in [`NamedLock`](super::NamedLock) is written once
//! against [`LockBackend`]. Platform differences (how a file is locked, what
//! identifies a file on disk) live in the implementation.

use fs2::FileExt;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// On-disk identity of a file, independent of the path that named it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn from_metadata(metadata: &fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        }
    }

    // No stable inode equivalent here; every file compares equal, which turns
    // the stale check into a no-op.
    #[cfg(not(unix))]
    fn from_metadata(_metadata: &fs::Metadata) -> Self {
        Self {
            device: 0,
            inode: 0,
        }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.inode)
    }
}

/// Operations the lock engine needs from the OS.
///
/// Closing the file must release any lock taken through it.
pub trait LockBackend: fmt::Debug {
    /// Block until an exclusive lock on `file` is granted.
    fn lock_exclusive(&self, file: &File) -> io::Result<()>;

    /// Try once to take an exclusive lock on `file`.
    ///
    /// Returns `Ok(false)` when another holder has it.
    fn try_lock_exclusive(&self, file: &File) -> io::Result<bool>;

    /// Identity of the file behind an open handle.
    fn handle_identity(&self, file: &File) -> io::Result<FileIdentity>;

    /// Identity of whatever `path` names right now; `None` if nothing does.
    fn path_identity(&self, path: &Path) -> io::Result<Option<FileIdentity>>;

    /// Whether a locked file may be unlinked before its handle is closed.
    ///
    /// Unix allows it; Windows refuses to delete open files.
    fn unlink_while_locked(&self) -> bool {
        cfg!(unix)
    }
}

/// Default backend: `flock`-style whole-file locks via fs2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fs2Backend;

impl LockBackend for Fs2Backend {
    fn lock_exclusive(&self, file: &File) -> io::Result<()> {
        FileExt::lock_exclusive(file)
    }

    fn try_lock_exclusive(&self, file: &File) -> io::Result<bool> {
        match FileExt::try_lock_exclusive(file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn handle_identity(&self, file: &File) -> io::Result<FileIdentity> {
        file.metadata().map(|m| FileIdentity::from_metadata(&m))
    }

    fn path_identity(&self, path: &Path) -> io::Result<Option<FileIdentity>> {
        match fs::metadata(path) {
            Ok(m) => Ok(Some(FileIdentity::from_metadata(&m))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
