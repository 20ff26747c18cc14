//! Lock name to lock file path resolution.
//!
//! Every process that uses the same name (and the same directory) must end
//! up contending on the same file, so the mapping is a pure function of its
//! inputs: no randomness, no per-process salt, no I/O.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Prefix that namespaces lock files inside a shared directory.
pub const LOCK_FILE_PREFIX: &str = "namelock";

/// Extension of every lock file.
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Compute the lowercase hex SHA-256 digest of a lock name.
pub fn name_digest(name: &str) -> String {
    hex::encode(Sha256::digest(name.as_bytes()))
}

/// Resolve a lock name to its lock file path.
///
/// Format: `<directory>/namelock-<sha256(name)>.lock`
///
/// # Arguments
///
/// * `name` - The logical lock name (any string)
/// * `directory` - Directory override; the platform temp directory when `None`
pub fn resolve_lock_path(name: &str, directory: Option<&Path>) -> PathBuf {
    let file_name = format!(
        "{}-{}.{}",
        LOCK_FILE_PREFIX,
        name_digest(name),
        LOCK_FILE_EXTENSION
    );

    match directory {
        Some(dir) => dir.join(file_name),
        None => std::env::temp_dir().join(file_name),
    }
}

/// Name and resolved path of a lock, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockIdentity {
    /// The logical lock name.
    pub name: String,

    /// The lock file path every contender opens.
    pub path: PathBuf,
}

impl LockIdentity {
    /// Resolve `name` against `directory` once.
    pub fn new(name: &str, directory: Option<&Path>) -> Self {
        Self {
            name: name.to_string(),
            path: resolve_lock_path(name, directory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_deterministic() {
        let dir = Path::new("/var/lock/app");
        assert_eq!(
            resolve_lock_path("db-migrations", Some(dir)),
            resolve_lock_path("db-migrations", Some(dir))
        );
    }

    #[test]
    fn test_distinct_names_get_distinct_paths() {
        let dir = Path::new("/var/lock/app");
        assert_ne!(
            resolve_lock_path("alpha", Some(dir)),
            resolve_lock_path("beta", Some(dir))
        );
        assert_ne!(
            resolve_lock_path("alpha", Some(dir)),
            resolve_lock_path("alpha ", Some(dir))
        );
    }

    #[test]
    fn test_path_layout() {
        let dir = Path::new("/srv/locks");
        let path = resolve_lock_path("abc", Some(dir));

        assert_eq!(path.parent(), Some(dir));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("lock"));

        // Known SHA-256 of "abc"
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(
                "namelock-ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.lock"
            )
        );
    }

    #[test]
    fn test_digest_is_fixed_length_hex() {
        for name in ["", "x", "a much longer lock name with spaces / and slashes"] {
            let digest = name_digest(name);
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_default_directory_is_temp_dir() {
        let path = resolve_lock_path("default-dir", None);
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
    }

    #[test]
    fn test_identity_captures_name_and_path() {
        let dir = Path::new("/tmp/x");
        let identity = LockIdentity::new("jobs", Some(dir));
        assert_eq!(identity.name, "jobs");
        assert_eq!(identity.path, resolve_lock_path("jobs", Some(dir)));
    }
}
