use std::path::PathBuf;

use serde_json::json;

use crate::outcome::ExecutionOutcome;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown installer `{0}` (expected `pip` or `uv`)")]
    UnknownInstaller(String),
    #[error("config file {} does not exist", .0.display())]
    MissingConfig(PathBuf),
}

/// A package-manager invocation that ran but did not succeed.
#[derive(thiserror::Error, Debug)]
#[error("`{command}` exited with status {code}")]
pub struct InstallerError {
    pub command: String,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InstallerError {
    /// The installer's own error text, falling back to stdout when stderr is
    /// empty.
    #[must_use]
    pub fn output(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Maps an error that escaped a command into the outcome reported to the
/// operator.
#[must_use]
pub fn outcome_from_error(err: &anyhow::Error) -> ExecutionOutcome {
    if let Some(installer) = err.downcast_ref::<InstallerError>() {
        return ExecutionOutcome::failure(
            installer.to_string(),
            json!({
                "reason": "installer_failed",
                "command": installer.command,
                "code": installer.code,
                "output": installer.output(),
                "hint": "the environment may be left partially switched; fix the installer error and re-run",
            }),
        );
    }
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return ExecutionOutcome::user_error(
            config.to_string(),
            json!({
                "reason": "invalid_config",
                "hint": "check [tool.forkswap] in pyproject.toml and the FORKSWAP_* variables",
            }),
        );
    }
    let issues: Vec<String> = err.chain().map(ToString::to_string).collect();
    ExecutionOutcome::failure(
        err.to_string(),
        json!({
            "reason": "internal_error",
            "issues": issues,
        }),
    )
}
