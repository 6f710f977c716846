use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::names::canonicalize_package_name;

pub const DEFAULT_OFFICIAL_PACKAGE: &str = "a2a-sdk";
pub const DEFAULT_LOCAL_PACKAGE: &str = "a2a-sdk-local";
pub const DEFAULT_IMPORT_NAME: &str = "a2a";
pub const DEFAULT_LOCAL_PATH: &str = "a2a-python";

/// The package pair the switcher moves between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageTarget {
    /// Distribution name published on the index.
    pub official: String,
    /// Distribution name the local fork registers under.
    pub local: String,
    /// Top-level module both distributions provide.
    pub import_name: String,
    /// Fork checkout, relative to the project root unless absolute.
    pub local_path: PathBuf,
}

impl Default for PackageTarget {
    fn default() -> Self {
        Self {
            official: DEFAULT_OFFICIAL_PACKAGE.to_string(),
            local: DEFAULT_LOCAL_PACKAGE.to_string(),
            import_name: DEFAULT_IMPORT_NAME.to_string(),
            local_path: PathBuf::from(DEFAULT_LOCAL_PATH),
        }
    }
}

impl PackageTarget {
    #[must_use]
    pub fn is_official(&self, name: &str) -> bool {
        canonicalize_package_name(name) == canonicalize_package_name(&self.official)
    }

    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        canonicalize_package_name(name) == canonicalize_package_name(&self.local)
    }

    /// Stem shared by every distribution of this package, used to filter
    /// listings.
    #[must_use]
    pub fn base_name(&self) -> String {
        canonicalize_package_name(&self.import_name)
    }

    /// Both distribution names; the official one first.
    #[must_use]
    pub fn distributions(&self) -> Vec<String> {
        let mut names = vec![self.official.clone()];
        if !self.is_official(&self.local) {
            names.push(self.local.clone());
        }
        names
    }

    /// Fork checkout resolved against `root`.
    #[must_use]
    pub fn local_dir(&self, root: &Path) -> PathBuf {
        if self.local_path.is_absolute() {
            self.local_path.clone()
        } else {
            root.join(&self.local_path)
        }
    }

    /// Last path component of the fork checkout, as it appears in workspace
    /// member lists.
    #[must_use]
    pub fn local_dir_name(&self) -> Option<String> {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }
}
