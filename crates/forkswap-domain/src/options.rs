use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml_edit::{DocumentMut, Item, Table};

/// Settings read from `[tool.forkswap]`. Unset keys fall back to defaults
/// higher up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForkswapOptions {
    pub official: Option<String>,
    pub local: Option<String>,
    pub import_name: Option<String>,
    pub local_path: Option<PathBuf>,
    pub manifests: Option<Vec<PathBuf>>,
    pub installer: Option<String>,
}

fn forkswap_table(doc: &DocumentMut) -> Option<&Table> {
    doc.get("tool")
        .and_then(Item::as_table)
        .and_then(|tool| tool.get("forkswap"))
        .and_then(Item::as_table)
}

fn non_empty_str(table: &Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(Item::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[must_use]
pub fn forkswap_options_from_doc(doc: &DocumentMut) -> ForkswapOptions {
    let Some(table) = forkswap_table(doc) else {
        return ForkswapOptions::default();
    };
    let manifests = table.get("manifests").and_then(Item::as_array).map(|array| {
        array
            .iter()
            .filter_map(|entry| entry.as_str())
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect()
    });
    ForkswapOptions {
        official: non_empty_str(table, "official"),
        local: non_empty_str(table, "local"),
        import_name: non_empty_str(table, "import"),
        local_path: non_empty_str(table, "path").map(PathBuf::from),
        manifests,
        installer: non_empty_str(table, "installer"),
    }
}

/// Reads `[tool.forkswap]` from a pyproject file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not valid TOML.
pub fn forkswap_options_from_path(path: &Path) -> Result<ForkswapOptions> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(forkswap_options_from_doc(&doc))
}

/// Walks up from `start` to the first directory whose `pyproject.toml`
/// carries a `[tool.forkswap]` table.
///
/// # Errors
///
/// Returns an error when a candidate pyproject cannot be read or parsed.
pub fn discover_project_root(start: &Path) -> Result<Option<PathBuf>> {
    let mut dir = start.to_path_buf();
    loop {
        let pyproject = dir.join("pyproject.toml");
        if pyproject.is_file() && pyproject_has_tool_forkswap(&pyproject)? {
            return Ok(Some(dir));
        }
        if !dir.pop() {
            break;
        }
    }
    Ok(None)
}

fn pyproject_has_tool_forkswap(path: &Path) -> Result<bool> {
    let contents = fs::read_to_string(path)?;
    let doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(forkswap_table(&doc).is_some())
}
