//! CLI argument parsing for namelock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Namelock: run commands under named cross-process locks.
///
/// A lock name maps to a file in the lock directory (the system temp
/// directory by default). Every process using the same name and directory
/// waits for the same lock.
#[derive(Parser, Debug)]
#[command(name = "namelock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for namelock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a lock.
    ///
    /// Waits for the lock (forever by default), runs the command, then
    /// releases the lock. Exits with the command's exit code.
    Run(RunArgs),

    /// Print the lock file path for a name.
    Path(PathArgs),

    /// Show whether a lock is held, and by whom.
    Inspect(InspectArgs),
}

/// Where a lock lives.
#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Lock name.
    pub name: String,

    /// Lock directory (defaults to the system temp directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// YAML file with lock options (poll_interval_ms, reentrant, lock_directory).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Milliseconds between attempts while waiting with a timeout.
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Give up after this many milliseconds (negative waits forever).
    #[arg(long, allow_negative_numbers = true)]
    pub timeout_ms: Option<i64>,

    /// Fail immediately if the lock is held elsewhere.
    ///
    /// A negative --timeout-ms means no timeout and may be combined with
    /// this flag; any other timeout is rejected.
    #[arg(long)]
    pub no_wait: bool,

    /// Command line to run, split like a shell would (no shell is started).
    #[arg(short = 'c', long, conflicts_with = "argv")]
    pub command: Option<String>,

    /// Command and arguments to run, after `--`.
    #[arg(last = true)]
    pub argv: Vec<String>,
}

/// Arguments for the `path` command.
#[derive(Parser, Debug)]
pub struct PathArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print JSON instead of a bare path.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inspect` command.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print JSON instead of a summary line.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
