//! Implementation of the `namelock run` command.
//!
//! Acquires the named lock, runs the command with inherited stdio, waits for
//! it, and releases the lock even when the command could not be started.

use super::build_options;
use crate::cli::RunArgs;
use namelock::error::{LockError, Result};
use namelock::exit_codes;
use namelock::locks::{NamedLock, timeout_from_millis};
use std::process::{Command, ExitStatus};
use tracing::info;

/// Execute the `namelock run` command.
///
/// Returns the child's exit code.
pub fn cmd_run(args: RunArgs) -> Result<i32> {
    let argv = command_argv(args.command.as_deref(), &args.argv)?;
    let options = build_options(
        args.config.as_deref(),
        args.location.dir.as_deref(),
        args.poll_ms,
    )?;

    let mut lock = NamedLock::new(&args.location.name, options)?;

    // Negative timeouts are normalized before the non-blocking check, so
    // `--no-wait --timeout-ms -1` is accepted and any other pairing is not.
    let blocking = !args.no_wait;
    let timeout = args.timeout_ms.and_then(timeout_from_millis);

    if !lock.acquire(blocking, timeout)? {
        return Err(LockError::NotAcquired {
            name: args.location.name,
        });
    }
    info!(name = %lock.name(), path = %lock.path().display(), "lock held, running command");

    let status = spawn_and_wait(&argv);
    let released = lock.release();

    let status = status?;
    released?;

    Ok(child_exit_code(status))
}

/// The code to exit with on behalf of the child.
///
/// A child killed by a signal maps to `128 + signo`, as shells report it.
fn child_exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    exit_codes::USER_ERROR
}

/// Resolve the command to run from `--command` or the trailing argv.
fn command_argv(command: Option<&str>, argv: &[String]) -> Result<Vec<String>> {
    let args = match command {
        Some(command) => shell_words::split(command).map_err(|e| {
            LockError::UserError(format!(
                "failed to parse command '{}': {}\n\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                command, e
            ))
        })?,
        None => argv.to_vec(),
    };

    if args.is_empty() {
        return Err(LockError::UserError(
            "no command given.\n\n\
             Usage: namelock run <NAME> -- <COMMAND> [ARGS...]"
                .to_string(),
        ));
    }

    Ok(args)
}

fn spawn_and_wait(argv: &[String]) -> Result<ExitStatus> {
    let (program, rest) = argv
        .split_first()
        .ok_or_else(|| LockError::UserError("no command given".to_string()))?;

    Command::new(program).args(rest).status().map_err(|e| {
        LockError::UserError(format!(
            "failed to execute '{}': {}\n\n\
             Fix: ensure the command is installed and in PATH.",
            program, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_string_is_split_like_a_shell() {
        let argv = command_argv(Some("echo 'hello world' \"a b\""), &[]).unwrap();
        assert_eq!(argv, vec!["echo", "hello world", "a b"]);
    }

    #[test]
    fn trailing_argv_is_used_verbatim() {
        let given = vec!["ls".to_string(), "-la".to_string()];
        assert_eq!(command_argv(None, &given).unwrap(), given);
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let err = command_argv(Some("echo 'oops"), &[]).unwrap_err();
        assert!(err.to_string().contains("failed to parse command"));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(command_argv(None, &[]).is_err());
        assert!(command_argv(Some("   "), &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn child_exit_code_is_passed_through() {
        let status = spawn_and_wait(&["sh".to_string(), "-c".to_string(), "exit 7".to_string()])
            .unwrap();
        assert_eq!(child_exit_code(status), 7);
    }

    #[cfg(unix)]
    #[test]
    fn signalled_child_maps_to_shell_convention() {
        let status = spawn_and_wait(&[
            "sh".to_string(),
            "-c".to_string(),
            "kill -TERM $$".to_string(),
        ])
        .unwrap();
        assert_eq!(child_exit_code(status), 128 + 15);
    }

    #[test]
    fn missing_program_is_user_error() {
        let err = spawn_and_wait(&["namelock-no-such-program-xyz".to_string()]).unwrap_err();
        assert!(matches!(err, LockError::UserError(_)));
    }
}
