//! The three operator verbs. Each invocation is a self-contained transaction:
//! nothing is remembered between runs and nothing is rolled back.

mod local;
mod official;
mod status;


pub use local::switch_to_local;
pub use official::switch_to_official;
pub use status::{environment_status, StatusReport};

use serde_json::{json, Value};

use crate::CommandContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchRequest {
    pub dry_run: bool,
}

/// Removes every registration of the package. A failure here usually means
/// nothing was installed, so it is logged and recorded but never propagated.
fn uninstall_tolerated(ctx: &CommandContext, names: &[String]) -> Value {
    match ctx.packages().uninstall(names) {
        Ok(()) => json!({ "packages": names, "ok": true }),
        Err(err) => {
            tracing::warn!(packages = ?names, error = %err, "uninstall failed; continuing");
            json!({ "packages": names, "ok": false, "error": err.to_string() })
        }
    }
}
