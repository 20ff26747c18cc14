//! Exit code constants for the namelock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, misuse of a lock)
//! - 2: Filesystem failure
//! - 3: Lock not acquired (contention or timeout)
//!
//! `namelock run` exits with the child's own code once the lock was held,
//! or `128 + signo` when the child was killed by a signal. A child exiting
//! with 1, 2 or 3 is therefore indistinguishable from the codes above; check
//! stderr for an `Error:` line to tell them apart.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid options, or lock misuse.
pub const USER_ERROR: i32 = 1;

/// Filesystem failure while creating, locking, or removing the lock file.
pub const IO_FAILURE: i32 = 2;

/// The lock could not be acquired before giving up.
pub const NOT_ACQUIRED: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, IO_FAILURE, NOT_ACQUIRED];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
