//! Pure data for forkswap: package naming, installer listings, active-state
//! classification and pyproject rewriting. Nothing here spawns processes.

mod listing;
mod manifest;
mod names;
mod options;
mod state;
mod target;

pub use listing::{matching_packages, parse_package_listing, InstalledPackage};
pub use manifest::{rewrite_manifest, ManifestEditor, RewriteReport};
pub use names::{canonicalize_package_name, dependency_name};
pub use options::{
    discover_project_root, forkswap_options_from_doc, forkswap_options_from_path,
    ForkswapOptions,
};
pub use state::{classify_installation, ActiveInstallation, ImportProbe};
pub use target::{
    PackageTarget, DEFAULT_IMPORT_NAME, DEFAULT_LOCAL_PACKAGE, DEFAULT_LOCAL_PATH,
    DEFAULT_OFFICIAL_PACKAGE,
};
