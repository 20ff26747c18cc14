//! Implementation of the `namelock inspect` command.
//!
//! Reports whether a lock is free, held (with holder metadata when the
//! holder recorded it), or left behind as an orphaned file.

use crate::cli::InspectArgs;
use namelock::error::{LockError, Result};
use namelock::locks::probe;
use namelock::naming::LockIdentity;
use serde_json::{Value, json};

/// Execute the `namelock inspect` command.
pub fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let identity = LockIdentity::new(&args.location.name, args.location.dir.as_deref());
    let status = probe(&identity.path)?;

    if args.json {
        let mut output = serde_json::to_value(&status)
            .map_err(|e| LockError::UserError(format!("failed to serialize status: {}", e)))?;
        if let Value::Object(map) = &mut output {
            map.insert("name".to_string(), json!(identity.name));
            map.insert("path".to_string(), json!(identity.path));
        }
        println!("{}", output);
    } else {
        println!("{}: {}", identity.name, status);
        println!("  Path: {}", identity.path.display());
    }

    Ok(())
}
