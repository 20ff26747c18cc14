//! Command implementations for namelock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus option handling shared between commands.

mod inspect;
mod path;
mod run;

use crate::cli::Command;
use namelock::error::Result;
use namelock::exit_codes;
use namelock::LockOptions;
use std::path::Path;
use std::time::Duration;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code on success.
pub fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Path(args) => path::cmd_path(args).map(|()| exit_codes::SUCCESS),
        Command::Inspect(args) => inspect::cmd_inspect(args).map(|()| exit_codes::SUCCESS),
    }
}

/// Build lock options from an optional YAML file and command-line overrides.
///
/// Flags win over the file.
fn build_options(
    config: Option<&Path>,
    dir: Option<&Path>,
    poll_ms: Option<u64>,
) -> Result<LockOptions> {
    let mut options = match config {
        Some(path) => LockOptions::load(path)?,
        None => LockOptions::default(),
    };

    if let Some(dir) = dir {
        options = options.with_lock_directory(dir);
    }
    if let Some(ms) = poll_ms {
        options = options.with_poll_interval(Duration::from_millis(ms));
    }

    options.validate()?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use namelock::LockError;
    use tempfile::TempDir;

    #[test]
    fn build_options_defaults() {
        let options = build_options(None, None, None).unwrap();
        assert_eq!(options, LockOptions::default());
    }

    #[test]
    fn build_options_flags_override_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("lock.yaml");
        std::fs::write(
            &config,
            "poll_interval_ms: 500\nreentrant: true\nlock_directory: /from/file\n",
        )
        .unwrap();

        let options =
            build_options(Some(&config), Some(Path::new("/from/flag")), Some(10)).unwrap();
        assert_eq!(options.poll_interval, Duration::from_millis(10));
        assert_eq!(options.lock_directory.as_deref(), Some(Path::new("/from/flag")));
        assert!(options.reentrant);
    }

    #[test]
    fn build_options_rejects_zero_poll() {
        let err = build_options(None, None, Some(0)).unwrap_err();
        assert!(matches!(err, LockError::InvalidArgument(_)));
    }
}
