use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::names::canonicalize_package_name;
use crate::target::PackageTarget;

/// One row of `pip list --format=json` (uv emits the same shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable_project_location: Option<String>,
}

impl InstalledPackage {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            editable_project_location: None,
        }
    }

    #[must_use]
    pub fn editable(mut self, location: impl Into<String>) -> Self {
        self.editable_project_location = Some(location.into());
        self
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable_project_location.is_some()
    }
}

/// Parses the JSON listing printed by the installer.
///
/// # Errors
///
/// Returns an error when the payload is not a JSON array of packages.
pub fn parse_package_listing(payload: &str) -> Result<Vec<InstalledPackage>> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    // pip may print upgrade notices after the array.
    serde_json::Deserializer::from_str(trimmed)
        .into_iter::<Vec<InstalledPackage>>()
        .next()
        .unwrap_or_else(|| Ok(Vec::new()))
        .context("invalid package listing payload")
}

/// Entries whose canonical name carries the package's base name.
#[must_use]
pub fn matching_packages(
    target: &PackageTarget,
    packages: &[InstalledPackage],
) -> Vec<InstalledPackage> {
    let base = target.base_name();
    let mut matches: Vec<InstalledPackage> = packages
        .iter()
        .filter(|pkg| {
            target.is_official(&pkg.name)
                || target.is_local(&pkg.name)
                || canonicalize_package_name(&pkg.name).contains(&base)
        })
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches
}
