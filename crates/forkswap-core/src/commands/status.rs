use anyhow::Result;
use forkswap_domain::{
    classify_installation, matching_packages, ActiveInstallation, ImportProbe, InstalledPackage,
};
use serde::Serialize;
use serde_json::json;

use crate::{CommandContext, ExecutionOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: ActiveInstallation,
    pub label: &'static str,
    pub listed: Vec<InstalledPackage>,
    pub probe: Option<ImportProbe>,
}

impl StatusReport {
    fn summary(&self) -> String {
        let Some(probe) = &self.probe else {
            return self.label.to_string();
        };
        let version = probe.version.as_deref().unwrap_or("unknown version");
        match probe.origin.as_deref() {
            Some(origin) => format!("{} ({version} from {origin})", self.label),
            None => format!("{} ({version})", self.label),
        }
    }
}

/// Reports which variant of the package the environment currently resolves.
/// Read-only.
///
/// # Errors
///
/// Returns an error when the installer listing or the import probe cannot run.
pub fn environment_status(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let target = ctx.config().target();
    let listed = matching_packages(target, &ctx.packages().list()?);
    let probe = ctx
        .python()
        .probe_import(&target.import_name, &target.distributions())?;
    let state = classify_installation(target, &listed, probe.as_ref());
    tracing::debug!(state = state.as_str(), listed = listed.len(), "classified environment");

    let report = StatusReport {
        state,
        label: state.label(),
        listed,
        probe,
    };
    let summary = report.summary();
    let mut details = json!({
        "state": report.state,
        "label": report.label,
        "packages": report.listed,
        "origin": report.probe.as_ref().and_then(|probe| probe.origin.clone()),
        "version": report.probe.as_ref().and_then(|probe| probe.version.clone()),
        "installer": ctx.config().installer().as_str(),
    });

    let outcome = match state {
        ActiveInstallation::NotInstalled => {
            details["reason"] = json!("not_installed");
            details["hint"] = json!("run `forkswap local` or `forkswap official` to install it");
            ExecutionOutcome::user_error(
                format!("{} is not installed", target.import_name),
                details,
            )
        }
        ActiveInstallation::Unregistered => {
            details["hint"] = json!(format!(
                "`{}` imports, but neither {} nor {} is registered; check PYTHONPATH",
                target.import_name, target.official, target.local
            ));
            ExecutionOutcome::success(summary, details)
        }
        ActiveInstallation::Local | ActiveInstallation::Official => {
            ExecutionOutcome::success(summary, details)
        }
    };
    Ok(outcome)
}
