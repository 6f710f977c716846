#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use tempfile::TempDir;

pub const ROOT_MANIFEST: &str = r#"[project]
name = "ap2"
version = "0.1.0"
dependencies = [
    # protocol SDK
    "a2a-sdk-local>=0.3.0",
    "httpx>=0.27",
]

[tool.uv.workspace]
members = ["samples/python", "a2a-python"]

[tool.uv.sources]
a2a-sdk-local = { workspace = true }
"#;

pub const SAMPLES_MANIFEST: &str = r#"[project]
name = "ap2-samples"
dependencies = [
    "a2a-sdk-local[http]",
    "google-adk",
]
"#;

/// Stands in for `python`: answers `-m pip list|install|uninstall` and the
/// `-c` import probe from a one-line state file (`name version location`).
const FAKE_PYTHON: &str = r#"#!/bin/sh
state="$FORKSWAP_FAKE_STATE"
touch "$state"
if [ "$1" = "-c" ]; then
    if [ ! -s "$state" ]; then
        echo '{"found": false}'
        exit 0
    fi
    read -r name version location < "$state"
    if [ "$location" = "-" ]; then
        origin="/venv/lib/site-packages/a2a/__init__.py"
    else
        origin="$location/src/a2a/__init__.py"
    fi
    printf '{"found": true, "origin": "%s", "version": "%s"}\n' "$origin" "$version"
    exit 0
fi
if [ "$1" != "-m" ] || [ "$2" != "pip" ]; then
    echo "unexpected invocation: $*" >&2
    exit 64
fi
shift 2
[ "$1" = "--disable-pip-version-check" ] && shift
verb="$1"
shift
case "$verb" in
    list)
        printf '['
        sep=''
        while read -r name version location; do
            if [ "$location" = "-" ]; then
                printf '%s{"name": "%s", "version": "%s"}' "$sep" "$name" "$version"
            else
                printf '%s{"name": "%s", "version": "%s", "editable_project_location": "%s"}' "$sep" "$name" "$version" "$location"
            fi
            sep=', '
        done < "$state"
        printf ']\n'
        echo '[notice] A new release of pip is available'
        ;;
    uninstall)
        [ "$1" = "-y" ] && shift
        if [ ! -s "$state" ]; then
            echo "WARNING: Skipping $* as it is not installed." >&2
            exit 1
        fi
        : > "$state"
        ;;
    install)
        if [ -n "$FORKSWAP_FAKE_FAIL_INSTALL" ]; then
            echo "ERROR: No matching distribution found for $*" >&2
            exit 1
        fi
        if [ "$1" = "-e" ]; then
            echo "a2a-sdk-local 0.3.1.dev0 $2" > "$state"
        else
            echo "$1 0.3.0 -" > "$state"
        fi
        ;;
esac
"#;

pub struct Project {
    _temp: TempDir,
    pub root: PathBuf,
    pub python: PathBuf,
    pub state: PathBuf,
}

impl Project {
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).expect("read manifest")
    }

    pub fn installed(&self) -> String {
        fs::read_to_string(&self.state)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    pub fn forkswap(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("forkswap");
        cmd.current_dir(&self.root)
            .env_remove("FORKSWAP_CONFIG")
            .env_remove("FORKSWAP_INSTALLER")
            .env_remove("FORKSWAP_LOCAL_PATH")
            .env_remove("FORKSWAP_FAKE_FAIL_INSTALL")
            .env("FORKSWAP_PYTHON", &self.python)
            .env("FORKSWAP_FAKE_STATE", &self.state)
            .env("NO_COLOR", "1");
        cmd
    }
}

pub fn prepare_project(prefix: &str) -> Project {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("ap2");
    fs::create_dir_all(root.join("a2a-python/src/a2a")).expect("fork checkout");
    fs::create_dir_all(root.join("samples/python")).expect("samples dir");
    fs::write(root.join("pyproject.toml"), ROOT_MANIFEST).expect("root manifest");
    fs::write(root.join("samples/python/pyproject.toml"), SAMPLES_MANIFEST)
        .expect("samples manifest");

    let python = temp.path().join("fake-python");
    write_executable(&python, FAKE_PYTHON);
    let state = temp.path().join("installed.txt");
    Project {
        _temp: temp,
        root,
        python,
        state,
    }
}

#[cfg(unix)]
fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, contents).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

#[cfg(not(unix))]
fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write script");
}

pub fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("json payload")
}

pub fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

pub fn stderr_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).to_string()
}
