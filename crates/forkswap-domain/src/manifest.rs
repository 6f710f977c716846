use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use toml_edit::{Array, DocumentMut, Item, TableLike, Value as TomlValue};

use crate::names::{canonicalize_package_name, dependency_name, RequirementParts};
use crate::target::PackageTarget;

/// What a manifest rewrite changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub path: PathBuf,
    /// `location: before -> after`; an empty `after` means the entry was
    /// dropped in favor of an existing official requirement.
    pub renamed: Vec<String>,
    pub removed_members: Vec<String>,
    pub removed_sources: Vec<String>,
}

impl RewriteReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renamed.is_empty() && self.removed_members.is_empty() && self.removed_sources.is_empty()
    }
}

/// A pyproject document opened for format-preserving edits.
#[derive(Debug)]
pub struct ManifestEditor {
    path: PathBuf,
    doc: DocumentMut,
}

impl ManifestEditor {
    /// Open `path` and parse it for editing.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self { path, doc })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.doc.to_string()
    }

    /// Points every reference to the fork at the official package, in memory.
    pub fn point_at_official(&mut self, target: &PackageTarget) -> RewriteReport {
        let mut report = RewriteReport {
            path: self.path.clone(),
            ..RewriteReport::default()
        };
        rename_requirements(&mut self.doc, target, &mut report);
        remove_workspace_members(&mut self.doc, target, &mut report);
        remove_fork_sources(&mut self.doc, target, &mut report);
        report
    }

    /// Points the document at the official package and saves it when
    /// something changed and `dry_run` is unset.
    ///
    /// # Errors
    ///
    /// Returns an error when the manifest cannot be written.
    pub fn rewrite(&mut self, target: &PackageTarget, dry_run: bool) -> Result<RewriteReport> {
        let report = self.point_at_official(target);
        let path = self.path.display();
        if report.is_empty() {
            tracing::debug!(path = %path, "manifest already references the official package");
            return Ok(report);
        }
        if dry_run {
            tracing::debug!(path = %path, "dry-run: manifest left untouched");
            return Ok(report);
        }
        self.save()?;
        tracing::info!(
            path = %path,
            renamed = report.renamed.len(),
            members = report.removed_members.len(),
            sources = report.removed_sources.len(),
            "rewrote manifest"
        );
        Ok(report)
    }

    /// Writes the document through a transient `<file>.bak` copy, restoring
    /// the original if the write fails.
    ///
    /// # Errors
    ///
    /// Returns an error when the backup or the manifest cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_with(|path, contents| fs::write(path, contents))
    }

    fn save_with<W>(&self, write: W) -> Result<()>
    where
        W: FnOnce(&Path, &str) -> io::Result<()>,
    {
        let backup = backup_path(&self.path);
        fs::copy(&self.path, &backup)
            .with_context(|| format!("failed to back up {}", self.path.display()))?;
        if let Err(err) = write(&self.path, &self.doc.to_string()) {
            fs::rename(&backup, &self.path)
                .with_context(|| format!("failed to restore {}", self.path.display()))?;
            return Err(err).with_context(|| format!("failed to write {}", self.path.display()));
        }
        fs::remove_file(&backup)
            .with_context(|| format!("failed to remove {}", backup.display()))?;
        Ok(())
    }
}

/// Rewrites one manifest to reference the official package. Nothing is
/// written when the manifest already does, or when `dry_run` is set.
///
/// # Errors
///
/// Returns an error when the manifest cannot be read, parsed or written.
pub fn rewrite_manifest(path: &Path, target: &PackageTarget, dry_run: bool) -> Result<RewriteReport> {
    ManifestEditor::open(path)?.rewrite(target, dry_run)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("pyproject.toml"), ToOwned::to_owned);
    name.push(".bak");
    path.with_file_name(name)
}

fn rename_requirements(doc: &mut DocumentMut, target: &PackageTarget, report: &mut RewriteReport) {
    if let Some(project) = doc.get_mut("project").and_then(Item::as_table_like_mut) {
        if let Some(array) = project.get_mut("dependencies").and_then(Item::as_array_mut) {
            rename_in_array(array, target, "project.dependencies", report);
        }
        if let Some(optional) = project
            .get_mut("optional-dependencies")
            .and_then(Item::as_table_like_mut)
        {
            rename_in_groups(optional, target, "project.optional-dependencies", report);
        }
    }
    if let Some(groups) = doc
        .get_mut("dependency-groups")
        .and_then(Item::as_table_like_mut)
    {
        rename_in_groups(groups, target, "dependency-groups", report);
    }
}

fn rename_in_groups(
    groups: &mut dyn TableLike,
    target: &PackageTarget,
    prefix: &str,
    report: &mut RewriteReport,
) {
    for (key, item) in groups.iter_mut() {
        if let Some(array) = item.as_array_mut() {
            let location = format!("{prefix}.{}", key.get());
            rename_in_array(array, target, &location, report);
        }
    }
}

fn rename_in_array(
    array: &mut Array,
    target: &PackageTarget,
    location: &str,
    report: &mut RewriteReport,
) {
    let official = canonicalize_package_name(&target.official);
    let has_official = array
        .iter()
        .filter_map(TomlValue::as_str)
        .any(|spec| dependency_name(spec) == official);
    let mut drop = Vec::new();
    for (idx, value) in array.iter_mut().enumerate() {
        let Some(spec) = value.as_str() else {
            continue;
        };
        if !target.is_local(&dependency_name(spec)) {
            continue;
        }
        if has_official {
            report.renamed.push(format!("{location}: {spec} -> "));
            drop.push(idx);
            continue;
        }
        let renamed = official_requirement(spec, &target.official);
        report.renamed.push(format!("{location}: {spec} -> {renamed}"));
        let decor = value.decor().clone();
        let mut replacement = TomlValue::from(renamed);
        *replacement.decor_mut() = decor;
        *value = replacement;
    }
    for idx in drop.into_iter().rev() {
        array.remove(idx);
    }
}

/// Swaps the fork's name for the official one, keeping extras, specifiers and
/// markers. A direct reference pointed at the fork, so only the marker
/// survives it.
fn official_requirement(spec: &str, official: &str) -> String {
    let parts = RequirementParts::split(spec);
    if parts.is_direct_reference() {
        return match parts.marker() {
            Some(marker) => format!("{official}{}; {marker}", parts.extras),
            None => format!("{official}{}", parts.extras),
        };
    }
    format!("{official}{}{}", parts.extras, parts.rest)
}

fn uv_table_mut(doc: &mut DocumentMut) -> Option<&mut dyn TableLike> {
    doc.get_mut("tool")
        .and_then(Item::as_table_like_mut)?
        .get_mut("uv")
        .and_then(Item::as_table_like_mut)
}

fn normalize_member(entry: &str) -> String {
    let mut value = entry.trim().replace('\\', "/");
    while let Some(stripped) = value.strip_prefix("./") {
        value = stripped.to_string();
    }
    value.trim_end_matches('/').to_string()
}

fn member_is_fork(entry: &str, target: &PackageTarget) -> bool {
    let normalized = normalize_member(entry);
    if normalized.is_empty() || normalized.contains('*') {
        return false;
    }
    let fork = normalize_member(&target.local_path.to_string_lossy());
    if normalized == fork {
        return true;
    }
    let last = normalized.rsplit('/').next().unwrap_or(&normalized);
    target.local_dir_name().is_some_and(|dir| dir == last)
}

fn remove_workspace_members(
    doc: &mut DocumentMut,
    target: &PackageTarget,
    report: &mut RewriteReport,
) {
    let Some(members) = uv_table_mut(doc)
        .and_then(|uv| uv.get_mut("workspace"))
        .and_then(Item::as_table_like_mut)
        .and_then(|workspace| workspace.get_mut("members"))
        .and_then(Item::as_array_mut)
    else {
        return;
    };
    let mut drop = Vec::new();
    for (idx, value) in members.iter().enumerate() {
        if let Some(entry) = value.as_str() {
            if member_is_fork(entry, target) {
                report.removed_members.push(entry.to_string());
                drop.push(idx);
            }
        }
    }
    for idx in drop.into_iter().rev() {
        members.remove(idx);
    }
}

fn source_points_at_fork(item: &Item, target: &PackageTarget) -> bool {
    let Some(source) = item.as_table_like() else {
        return false;
    };
    if source.get("workspace").and_then(Item::as_bool) == Some(true) {
        return true;
    }
    source
        .get("path")
        .and_then(Item::as_str)
        .is_some_and(|path| member_is_fork(path, target))
}

fn remove_fork_sources(doc: &mut DocumentMut, target: &PackageTarget, report: &mut RewriteReport) {
    let Some(sources) = uv_table_mut(doc)
        .and_then(|uv| uv.get_mut("sources"))
        .and_then(Item::as_table_like_mut)
    else {
        return;
    };
    let doomed: Vec<String> = sources
        .iter()
        .filter(|(key, item)| {
            target.is_local(key) || (target.is_official(key) && source_points_at_fork(item, target))
        })
        .map(|(key, _)| key.to_string())
        .collect();
    for key in doomed {
        sources.remove(&key);
        report.removed_sources.push(key);
    }
}
