use std::{collections::HashMap, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    model::{InstallState, ManifestEntry},
    version::ModVersion,
};

/// Answers whether a mod is installed locally, at which version, and whether
/// it is enabled.
///
/// Implementations must be side-effect free from the catalog's point of
/// view; the catalog calls this once per manifest entry while reconciling.
pub trait InstallStateResolver: Send + Sync {
    fn resolve(&self, entry: &ManifestEntry) -> InstallState;
}

impl<F> InstallStateResolver for F
where
    F: Fn(&ManifestEntry) -> InstallState + Send + Sync,
{
    fn resolve(&self, entry: &ManifestEntry) -> InstallState {
        self(entry)
    }
}

/// Resolver that reports every mod as not installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NothingInstalled;

impl InstallStateResolver for NothingInstalled {
    fn resolve(&self, _entry: &ManifestEntry) -> InstallState {
        InstallState::NotInstalled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledMod {
    pub version: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Install state read from an `installed.json` file kept by the installer:
///
/// ```json
/// { "mods": { "NormalEx": { "version": "1.0.0.0", "enabled": true } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledMods {
    #[serde(default)]
    pub mods: HashMap<String, InstalledMod>,
}

impl InstalledMods {
    /// Loads the file at `path`. A missing file means nothing is installed.
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        debug!("Loading install state from {}", path.display());
        match tokio::fs::read(path).await {
            Ok(data) => {
                let mods: InstalledMods = serde_json::from_slice(&data)?;
                info!("{} installed mods recorded", mods.mods.len());
                Ok(mods)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No install state at {}, assuming no mods installed", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }
}

impl InstallStateResolver for InstalledMods {
    fn resolve(&self, entry: &ManifestEntry) -> InstallState {
        let Some(installed) = self.mods.get(&entry.name) else {
            return InstallState::NotInstalled;
        };
        match installed.version.parse::<ModVersion>() {
            Ok(version) => InstallState::installed(installed.enabled, version),
            Err(e) => {
                // An unreadable version reads as 0, older than any released version.
                warn!("Installed {} has {}", entry.name, e);
                InstallState::installed(installed.enabled, ModVersion::new(vec![0]))
                    .against(&entry.version)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn entry(name: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            version: "1.0".parse().unwrap(),
            link: String::new(),
            sha256: String::new(),
            description: String::new(),
            repository: String::new(),
            dependencies: vec![],
            integrations: vec![],
            tags: vec![],
            authors: vec![],
        }
    }

    #[tokio::test]
    async fn missing_file_means_nothing_installed() {
        let dir = tempfile::tempdir().unwrap();
        let mods = InstalledMods::load(&dir.path().join("installed.json"))
            .await
            .unwrap();
        assert!(mods.mods.is_empty());
        assert_eq!(mods.resolve(&entry("NormalEx")), InstallState::NotInstalled);
    }

    #[tokio::test]
    async fn reads_versions_and_toggles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "mods": {{
                "NormalEx": {{ "version": "1.0.0.0", "enabled": true }},
                "Disabled": {{ "version": "0.9", "enabled": false }},
                "Weird": {{ "version": "beta" }}
            }} }}"#
        )
        .unwrap();

        let mods = InstalledMods::load(file.path()).await.unwrap();

        assert_eq!(
            mods.resolve(&entry("NormalEx")),
            InstallState::installed(true, "1.0".parse().unwrap())
        );
        assert!(!mods.resolve(&entry("Disabled")).is_enabled());
        let weird = mods.resolve(&entry("Weird"));
        assert!(weird.is_enabled());
        assert!(weird.update_available());
        assert_eq!(mods.resolve(&entry("Other")), InstallState::NotInstalled);
    }

    #[test]
    fn unreadable_version_reads_as_zero() {
        let mods = InstalledMods {
            mods: HashMap::from([(
                "Weird".to_string(),
                InstalledMod {
                    version: "beta".into(),
                    enabled: true,
                },
            )]),
        };
        let released = entry("Weird");
        let unversioned = ManifestEntry {
            version: "0.0".parse().unwrap(),
            ..entry("Weird")
        };

        let state = mods.resolve(&released);
        assert!(state.update_available());
        assert_eq!(state.clone().against(&released.version), state);

        let state = mods.resolve(&unversioned);
        assert!(state.is_installed());
        assert!(!state.update_available());
        assert_eq!(state.clone().against(&unversioned.version), state);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(InstalledMods::load(file.path()).await.is_err());
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |e: &ManifestEntry| {
            if e.name == "NormalEx" {
                InstallState::installed(false, "1.0".parse().unwrap())
            } else {
                InstallState::NotInstalled
            }
        };
        assert!(resolver.resolve(&entry("NormalEx")).is_installed());
        assert!(!NothingInstalled.resolve(&entry("NormalEx")).is_installed());
    }
}
