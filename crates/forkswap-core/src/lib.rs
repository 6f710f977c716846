#![deny(clippy::all, warnings)]

mod commands;
mod config;
mod context;
mod effects;
mod errors;
mod outcome;
pub mod process;
mod python;

pub use crate::commands::{
    environment_status, switch_to_local, switch_to_official, StatusReport, SwitchRequest,
};
pub use crate::config::{
    Config, EnvSnapshot, GlobalOptions, Installer, CONFIG_ENV, DEFAULT_MANIFESTS, INSTALLER_ENV,
    LOCAL_PATH_ENV, PYTHON_ENV,
};
pub use crate::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::effects::{
    Effects, InstallSpec, PackageManager, PythonRuntime, SharedEffects, SystemEffects,
};
pub use crate::errors::{outcome_from_error, ConfigError, InstallerError};
pub use crate::outcome::{format_status_message, to_json_response, CommandStatus, ExecutionOutcome};
