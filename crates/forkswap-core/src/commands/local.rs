use anyhow::Result;
use serde_json::json;

use super::{uninstall_tolerated, SwitchRequest};
use crate::effects::InstallSpec;
use crate::{CommandContext, ExecutionOutcome};

/// Replaces any registration of the package with an editable install of the
/// local fork checkout.
///
/// # Errors
///
/// Returns an error when the install itself fails; the preceding uninstall is
/// allowed to fail.
pub fn switch_to_local(ctx: &CommandContext, request: &SwitchRequest) -> Result<ExecutionOutcome> {
    let target = ctx.config().target();
    let local_dir = ctx.config().local_dir();
    if !local_dir.is_dir() {
        return Ok(ExecutionOutcome::user_error(
            format!("local checkout {} not found", local_dir.display()),
            json!({
                "reason": "missing_local_checkout",
                "path": local_dir.display().to_string(),
                "hint": "clone the fork there or point [tool.forkswap].path / FORKSWAP_LOCAL_PATH at it",
            }),
        ));
    }

    let names = target.distributions();
    let spec = InstallSpec::editable(&local_dir);

    if request.dry_run {
        let commands = vec![
            ctx.packages().describe_uninstall(&names)?,
            ctx.packages().describe_install(&spec)?,
        ];
        return Ok(ExecutionOutcome::success(
            "planned switch to the local fork (dry-run)",
            json!({
                "dry_run": true,
                "commands": commands,
                "path": local_dir.display().to_string(),
            }),
        ));
    }

    let uninstall = uninstall_tolerated(ctx, &names);
    tracing::info!(path = %local_dir.display(), "installing local fork in editable mode");
    ctx.packages().install(&spec)?;

    Ok(ExecutionOutcome::success(
        format!(
            "switched {} to the local fork at {}",
            target.import_name,
            local_dir.display()
        ),
        json!({
            "state": "local",
            "path": local_dir.display().to_string(),
            "installed": spec,
            "uninstall": uninstall,
            "hint": "run `forkswap status` to confirm which copy is imported",
        }),
    ))
}
