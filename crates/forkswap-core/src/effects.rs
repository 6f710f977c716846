//! Collaborators with side effects: the package registry and the Python
//! runtime. Operations only reach the outside world through these traits.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use forkswap_domain::{parse_package_listing, ImportProbe, InstalledPackage};
use serde::Serialize;
use which::which;

use crate::config::{Config, Installer};
use crate::errors::InstallerError;
use crate::process::{display_command, run_command, run_command_streaming, RunOutput};
use crate::python;

/// What to hand the installer: a requirement or, for editable installs, a
/// source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallSpec {
    pub requirement: String,
    pub editable: bool,
}

impl InstallSpec {
    #[must_use]
    pub fn editable(path: &Path) -> Self {
        Self {
            requirement: path.display().to_string(),
            editable: true,
        }
    }

    #[must_use]
    pub fn published(name: &str) -> Self {
        Self {
            requirement: name.to_string(),
            editable: false,
        }
    }
}

pub trait PackageManager: Send + Sync {
    /// # Errors
    /// Returns [`InstallerError`] when the installer exits non-zero.
    fn install(&self, spec: &InstallSpec) -> Result<()>;
    /// # Errors
    /// Returns [`InstallerError`] when the installer exits non-zero.
    fn uninstall(&self, names: &[String]) -> Result<()>;
    /// # Errors
    /// Returns an error when the listing cannot be produced or parsed.
    fn list(&self) -> Result<Vec<InstalledPackage>>;
    /// The command line `install` would run.
    ///
    /// # Errors
    /// Returns an error when the interpreter cannot be located.
    fn describe_install(&self, spec: &InstallSpec) -> Result<String>;
    /// The command line `uninstall` would run.
    ///
    /// # Errors
    /// Returns an error when the interpreter cannot be located.
    fn describe_uninstall(&self, names: &[String]) -> Result<String>;
}

pub trait PythonRuntime: Send + Sync {
    /// # Errors
    /// Returns an error when no interpreter can be located.
    fn interpreter(&self) -> Result<String>;
    /// # Errors
    /// Returns an error when the probe cannot run; a failed import is `Ok(None)`.
    fn probe_import(
        &self,
        import_name: &str,
        distributions: &[String],
    ) -> Result<Option<ImportProbe>>;
}

pub trait Effects: Send + Sync {
    fn packages(&self) -> &dyn PackageManager;
    fn python(&self) -> &dyn PythonRuntime;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    python: Arc<SystemPythonRuntime>,
    packages: SystemPackageManager,
}

impl SystemEffects {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let python = Arc::new(SystemPythonRuntime {
            explicit: config.python().map(ToString::to_string),
            cwd: config.root().to_path_buf(),
            resolved: OnceLock::new(),
        });
        let packages = SystemPackageManager {
            installer: config.installer(),
            python: Arc::clone(&python),
            cwd: config.root().to_path_buf(),
        };
        Self { python, packages }
    }

    #[must_use]
    pub fn shared(config: &Config) -> SharedEffects {
        Arc::new(Self::new(config))
    }
}

impl Effects for SystemEffects {
    fn packages(&self) -> &dyn PackageManager {
        &self.packages
    }

    fn python(&self) -> &dyn PythonRuntime {
        self.python.as_ref()
    }
}

struct SystemPythonRuntime {
    explicit: Option<String>,
    cwd: PathBuf,
    resolved: OnceLock<String>,
}

impl PythonRuntime for SystemPythonRuntime {
    fn interpreter(&self) -> Result<String> {
        if let Some(path) = self.resolved.get() {
            return Ok(path.clone());
        }
        let path = python::detect_interpreter(self.explicit.as_deref())?;
        tracing::debug!(python = %path, "using interpreter");
        let _ = self.resolved.set(path.clone());
        Ok(path)
    }

    fn probe_import(
        &self,
        import_name: &str,
        distributions: &[String],
    ) -> Result<Option<ImportProbe>> {
        let python = self.interpreter()?;
        python::probe_import(&python, import_name, distributions, &self.cwd)
    }
}

struct SystemPackageManager {
    installer: Installer,
    python: Arc<SystemPythonRuntime>,
    cwd: PathBuf,
}

enum Verb<'a> {
    Install(&'a InstallSpec),
    Uninstall(&'a [String]),
    List,
}

impl SystemPackageManager {
    fn command(&self, verb: &Verb<'_>) -> Result<(String, Vec<String>)> {
        let python = self.python.interpreter()?;
        let (program, mut args) = match self.installer {
            Installer::Pip => (
                python.clone(),
                vec![
                    "-m".to_string(),
                    "pip".to_string(),
                    "--disable-pip-version-check".to_string(),
                ],
            ),
            Installer::Uv => (uv_program(), vec!["pip".to_string()]),
        };
        let python_flag = |args: &mut Vec<String>| {
            if self.installer == Installer::Uv {
                args.push("--python".to_string());
                args.push(python.clone());
            }
        };
        match verb {
            Verb::Install(spec) => {
                args.push("install".to_string());
                python_flag(&mut args);
                if spec.editable {
                    args.push("-e".to_string());
                }
                args.push(spec.requirement.clone());
            }
            Verb::Uninstall(names) => {
                args.push("uninstall".to_string());
                python_flag(&mut args);
                if self.installer == Installer::Pip {
                    args.push("-y".to_string());
                }
                args.extend(names.iter().cloned());
            }
            Verb::List => {
                args.push("list".to_string());
                python_flag(&mut args);
                args.push("--format=json".to_string());
            }
        }
        Ok((program, args))
    }

    fn run_checked(&self, verb: &Verb<'_>) -> Result<RunOutput> {
        let (program, args) = self.command(verb)?;
        let output = run_command_streaming(&program, &args, &self.cwd)?;
        if output.succeeded() {
            return Ok(output);
        }
        Err(InstallerError {
            command: display_command(&program, &args),
            code: output.code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
        .into())
    }
}

fn uv_program() -> String {
    which("uv").map_or_else(
        |_| "uv".to_string(),
        |path| path.to_string_lossy().to_string(),
    )
}

impl PackageManager for SystemPackageManager {
    fn install(&self, spec: &InstallSpec) -> Result<()> {
        self.run_checked(&Verb::Install(spec)).map(|_| ())
    }

    fn uninstall(&self, names: &[String]) -> Result<()> {
        self.run_checked(&Verb::Uninstall(names)).map(|_| ())
    }

    fn list(&self) -> Result<Vec<InstalledPackage>> {
        let (program, args) = self.command(&Verb::List)?;
        let output = run_command(&program, &args, &self.cwd)?;
        if !output.succeeded() {
            return Err(InstallerError {
                command: display_command(&program, &args),
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
            }
            .into());
        }
        parse_package_listing(&output.stdout)
    }

    fn describe_install(&self, spec: &InstallSpec) -> Result<String> {
        let (program, args) = self.command(&Verb::Install(spec))?;
        Ok(display_command(&program, &args))
    }

    fn describe_uninstall(&self, names: &[String]) -> Result<String> {
        let (program, args) = self.command(&Verb::Uninstall(names))?;
        Ok(display_command(&program, &args))
    }
}
