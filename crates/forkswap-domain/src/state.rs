use serde::{Deserialize, Serialize};

use crate::listing::InstalledPackage;
use crate::target::PackageTarget;

/// Where the runtime resolved the package module from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProbe {
    pub origin: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveInstallation {
    Local,
    Official,
    /// Importable, but registered under neither distribution name.
    Unregistered,
    NotInstalled,
}

impl ActiveInstallation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "LOCAL VERSION",
            Self::Official => "OFFICIAL VERSION",
            Self::Unregistered => "UNREGISTERED",
            Self::NotInstalled => "NOT INSTALLED",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Official => "official",
            Self::Unregistered => "unregistered",
            Self::NotInstalled => "not-installed",
        }
    }
}

/// Classifies the environment from the installer listing and the import probe.
///
/// A failed import wins over the listing. An editable install registered under
/// the official name counts as the fork.
#[must_use]
pub fn classify_installation(
    target: &PackageTarget,
    listed: &[InstalledPackage],
    probe: Option<&ImportProbe>,
) -> ActiveInstallation {
    if probe.is_none() {
        return ActiveInstallation::NotInstalled;
    }
    let local = listed.iter().any(|pkg| {
        target.is_local(&pkg.name) || (target.is_official(&pkg.name) && pkg.is_editable())
    });
    if local {
        return ActiveInstallation::Local;
    }
    if listed.iter().any(|pkg| target.is_official(&pkg.name)) {
        ActiveInstallation::Official
    } else {
        ActiveInstallation::Unregistered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> ImportProbe {
        ImportProbe {
            origin: Some("/venv/site-packages/a2a/__init__.py".into()),
            version: Some("0.3.0".into()),
        }
    }

    #[test]
    fn failed_import_is_not_installed_even_when_listed() {
        let target = PackageTarget::default();
        let listed = vec![InstalledPackage::new("a2a-sdk", "0.3.0")];
        assert_eq!(
            classify_installation(&target, &listed, None),
            ActiveInstallation::NotInstalled
        );
    }

    #[test]
    fn fork_name_in_listing_is_local() {
        let target = PackageTarget::default();
        let listed = vec![
            InstalledPackage::new("a2a-sdk", "0.3.0"),
            InstalledPackage::new("a2a_sdk_local", "0.3.1.dev0"),
        ];
        assert_eq!(
            classify_installation(&target, &listed, Some(&probe())),
            ActiveInstallation::Local
        );
    }

    #[test]
    fn editable_official_name_is_local() {
        let target = PackageTarget::default();
        let listed = vec![InstalledPackage::new("a2a-sdk", "0.3.1").editable("/repo/a2a-python")];
        assert_eq!(
            classify_installation(&target, &listed, Some(&probe())),
            ActiveInstallation::Local
        );
    }

    #[test]
    fn only_official_name_is_official() {
        let target = PackageTarget::default();
        let listed = vec![InstalledPackage::new("a2a-sdk", "0.3.0")];
        let state = classify_installation(&target, &listed, Some(&probe()));
        assert_eq!(state, ActiveInstallation::Official);
        assert_eq!(state.label(), "OFFICIAL VERSION");
    }

    #[test]
    fn importable_but_unlisted_is_unregistered() {
        let target = PackageTarget::default();
        assert_eq!(
            classify_installation(&target, &[], Some(&probe())),
            ActiveInstallation::Unregistered
        );
    }
}
