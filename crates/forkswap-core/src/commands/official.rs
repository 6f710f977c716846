use anyhow::Result;
use forkswap_domain::{ManifestEditor, RewriteReport};
use serde_json::json;

use super::{uninstall_tolerated, SwitchRequest};
use crate::effects::InstallSpec;
use crate::{CommandContext, ExecutionOutcome};

/// Points the manifests back at the published package, then swaps the
/// installed registration for it.
///
/// # Errors
///
/// Returns an error when a manifest is missing or cannot be rewritten, and
/// when the install fails. A manifest error stops the command before the
/// package manager runs.
pub fn switch_to_official(
    ctx: &CommandContext,
    request: &SwitchRequest,
) -> Result<ExecutionOutcome> {
    let target = ctx.config().target();

    // Every manifest must parse before any of them is written.
    let mut editors = ctx
        .config()
        .manifests()
        .iter()
        .map(ManifestEditor::open)
        .collect::<Result<Vec<_>>>()?;
    let reports = editors
        .iter_mut()
        .map(|editor| editor.rewrite(target, request.dry_run))
        .collect::<Result<Vec<RewriteReport>>>()?;
    let changed = reports.iter().filter(|report| !report.is_empty()).count();

    let names = target.distributions();
    let spec = InstallSpec::published(&target.official);

    if request.dry_run {
        let commands = vec![
            ctx.packages().describe_uninstall(&names)?,
            ctx.packages().describe_install(&spec)?,
        ];
        return Ok(ExecutionOutcome::success(
            format!("planned switch to {} (dry-run)", target.official),
            json!({
                "dry_run": true,
                "manifests": reports,
                "commands": commands,
            }),
        ));
    }

    let uninstall = uninstall_tolerated(ctx, &names);
    tracing::info!(package = %target.official, "installing the published package");
    ctx.packages().install(&spec)?;

    Ok(ExecutionOutcome::success(
        format!(
            "switched {} to the official {} package",
            target.import_name, target.official
        ),
        json!({
            "state": "official",
            "manifests": reports,
            "manifests_changed": changed,
            "installed": spec,
            "uninstall": uninstall,
        }),
    ))
}
