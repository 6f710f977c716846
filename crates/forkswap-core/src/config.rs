//! Configuration layering: built-in defaults, then `[tool.forkswap]`, then
//! the process environment.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use forkswap_domain::{
    discover_project_root, forkswap_options_from_path, ForkswapOptions, PackageTarget,
};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const CONFIG_ENV: &str = "FORKSWAP_CONFIG";
pub const PYTHON_ENV: &str = "FORKSWAP_PYTHON";
pub const INSTALLER_ENV: &str = "FORKSWAP_INSTALLER";
pub const LOCAL_PATH_ENV: &str = "FORKSWAP_LOCAL_PATH";

pub const DEFAULT_MANIFESTS: [&str; 2] = ["pyproject.toml", "samples/python/pyproject.toml"];

/// Command-line settings that reach configuration loading.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// `--config`: read `[tool.forkswap]` from this file.
    pub config: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

/// Which front-end drives the package registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Installer {
    #[default]
    Pip,
    Uv,
}

impl Installer {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Installer::Pip => "pip",
            Installer::Uv => "uv",
        }
    }
}

impl fmt::Display for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Installer {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pip" => Ok(Installer::Pip),
            "uv" => Ok(Installer::Uv),
            other => Err(ConfigError::UnknownInstaller(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) root: PathBuf,
    pub(crate) source: Option<PathBuf>,
    pub(crate) target: PackageTarget,
    pub(crate) manifests: Vec<PathBuf>,
    pub(crate) installer: Installer,
    pub(crate) python: Option<String>,
}

impl Config {
    /// Resolves configuration for a command started in `cwd`.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file cannot be read or carries an
    /// invalid value.
    pub fn load(global: &GlobalOptions, snapshot: &EnvSnapshot, cwd: &Path) -> Result<Self> {
        let explicit = global
            .config
            .clone()
            .or_else(|| snapshot.var(CONFIG_ENV).map(ToString::to_string))
            .map(|raw| absolutize(cwd, Path::new(&raw)));

        let (root, source) = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::MissingConfig(path).into());
                }
                let root = path
                    .parent()
                    .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                (root, Some(path))
            }
            None => match discover_project_root(cwd)? {
                Some(root) => {
                    let source = root.join("pyproject.toml");
                    (root, Some(source))
                }
                None => (cwd.to_path_buf(), None),
            },
        };

        let options = match &source {
            Some(path) => forkswap_options_from_path(path)?,
            None => ForkswapOptions::default(),
        };
        tracing::debug!(root = %root.display(), source = ?source, "resolved forkswap configuration");
        Self::from_options(root, source, options, snapshot)
    }

    pub(crate) fn from_options(
        root: PathBuf,
        source: Option<PathBuf>,
        options: ForkswapOptions,
        snapshot: &EnvSnapshot,
    ) -> Result<Self> {
        let defaults = PackageTarget::default();
        let mut target = PackageTarget {
            official: options.official.unwrap_or(defaults.official),
            local: options.local.unwrap_or(defaults.local),
            import_name: options.import_name.unwrap_or(defaults.import_name),
            local_path: options.local_path.unwrap_or(defaults.local_path),
        };
        if let Some(path) = snapshot.var(LOCAL_PATH_ENV) {
            target.local_path = PathBuf::from(path);
        }

        let installer = match snapshot.var(INSTALLER_ENV).or(options.installer.as_deref()) {
            Some(raw) => raw.parse::<Installer>()?,
            None => Installer::default(),
        };

        let manifests = options
            .manifests
            .unwrap_or_else(|| DEFAULT_MANIFESTS.iter().map(PathBuf::from).collect())
            .into_iter()
            .map(|path| absolutize(&root, &path))
            .collect();

        Ok(Self {
            root,
            source,
            target,
            manifests,
            installer,
            python: snapshot.var(PYTHON_ENV).map(ToString::to_string),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The pyproject or config file the settings came from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn target(&self) -> &PackageTarget {
        &self.target
    }

    #[must_use]
    pub fn manifests(&self) -> &[PathBuf] {
        &self.manifests
    }

    #[must_use]
    pub fn installer(&self) -> Installer {
        self.installer
    }

    #[must_use]
    pub fn python(&self) -> Option<&str> {
        self.python.as_deref()
    }

    #[must_use]
    pub fn local_dir(&self) -> PathBuf {
        self.target.local_dir(&self.root)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
