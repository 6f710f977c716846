use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use forkswap_domain::ImportProbe;
use serde::Deserialize;
use which::which;

use crate::process::{display_command, run_command};

const IMPORT_PROBE_SCRIPT: &str = r#"import importlib, json, sys
name = sys.argv[1]
dists = sys.argv[2:]
try:
    module = importlib.import_module(name)
except Exception:
    print(json.dumps({"found": False}))
    sys.exit(0)
version = None
try:
    from importlib import metadata
    for dist in dists:
        try:
            version = metadata.version(dist)
            break
        except metadata.PackageNotFoundError:
            continue
except Exception:
    version = None
if version is None:
    version = getattr(module, "__version__", None)
origin = getattr(module, "__file__", None)
if origin is None:
    paths = list(getattr(module, "__path__", []))
    origin = paths[0] if paths else None
print(json.dumps({"found": True, "origin": origin, "version": version}))
"#;

/// Finds the interpreter whose environment forkswap manages.
///
/// # Errors
///
/// Returns an error when no interpreter is on `PATH` or its path is not valid
/// UTF-8.
pub fn detect_interpreter(explicit: Option<&str>) -> Result<String> {
    if let Some(explicit) = explicit {
        return Ok(explicit.to_string());
    }
    for candidate in ["python3", "python"] {
        if let Ok(path) = which(candidate) {
            return path
                .into_os_string()
                .into_string()
                .map_err(|_| anyhow!("non-utf8 path"));
        }
    }
    bail!("no python interpreter found; set FORKSWAP_PYTHON")
}

#[derive(Deserialize)]
struct ImportProbePayload {
    found: bool,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Imports `import_name` in `python` and reports where it resolved from.
/// `Ok(None)` means the import failed.
///
/// # Errors
///
/// Returns an error when the interpreter cannot run the probe or prints an
/// unexpected payload.
pub fn probe_import(
    python: &str,
    import_name: &str,
    distributions: &[String],
    cwd: &Path,
) -> Result<Option<ImportProbe>> {
    let mut args = vec![
        "-c".to_string(),
        IMPORT_PROBE_SCRIPT.to_string(),
        import_name.to_string(),
    ];
    args.extend(distributions.iter().cloned());
    let output = run_command(python, &args, cwd)?;
    if !output.succeeded() {
        bail!(
            "import probe failed ({}): {}",
            display_command(python, &["-c".to_string(), "<probe>".to_string()]),
            output.stderr.trim()
        );
    }
    parse_probe_payload(&output.stdout)
}

fn parse_probe_payload(stdout: &str) -> Result<Option<ImportProbe>> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    let payload: ImportProbePayload =
        serde_json::from_str(line.trim()).context("invalid import probe payload")?;
    if !payload.found {
        return Ok(None);
    }
    Ok(Some(ImportProbe {
        origin: payload.origin,
        version: payload.version,
    }))
}
