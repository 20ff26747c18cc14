//! Implementation of the `namelock path` command.

use crate::cli::PathArgs;
use namelock::error::Result;
use namelock::naming::LockIdentity;
use serde_json::json;

/// Execute the `namelock path` command.
pub fn cmd_path(args: PathArgs) -> Result<()> {
    let identity = LockIdentity::new(&args.location.name, args.location.dir.as_deref());

    if args.json {
        let output = json!({
            "name": identity.name,
            "path": identity.path,
        });
        println!("{}", output);
    } else {
        println!("{}", identity.path.display());
    }

    Ok(())
}
