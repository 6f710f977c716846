use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{Config, EnvSnapshot, GlobalOptions};
use crate::effects::{Effects, PackageManager, PythonRuntime, SharedEffects, SystemEffects};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Local,
    Official,
    Status,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Local => "local",
            CommandGroup::Official => "official",
            CommandGroup::Status => "status",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext {
    config: Config,
    effects: SharedEffects,
}

impl CommandContext {
    /// Loads configuration from the working directory and wires the system
    /// collaborators.
    ///
    /// # Errors
    /// Returns an error if the working directory or configuration cannot be read.
    pub fn new(global: &GlobalOptions) -> Result<Self> {
        let cwd = std::env::current_dir().context("unable to determine working directory")?;
        let config = Config::load(global, &EnvSnapshot::capture(), &cwd)?;
        let effects = SystemEffects::shared(&config);
        Ok(Self::with_effects(config, effects))
    }

    #[must_use]
    pub fn with_effects(config: Config, effects: SharedEffects) -> Self {
        Self { config, effects }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    pub fn packages(&self) -> &dyn PackageManager {
        Effects::packages(self.effects.as_ref())
    }

    pub fn python(&self) -> &dyn PythonRuntime {
        Effects::python(self.effects.as_ref())
    }
}
