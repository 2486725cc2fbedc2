use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::Serialize;

use crate::version::ModVersion;

/// Closed tag vocabulary for catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tag {
    Boss,
    Cosmetic,
    Expansion,
    Gameplay,
    Library,
    Utility,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Boss,
        Tag::Cosmetic,
        Tag::Expansion,
        Tag::Gameplay,
        Tag::Library,
        Tag::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Boss => "Boss",
            Tag::Cosmetic => "Cosmetic",
            Tag::Expansion => "Expansion",
            Tag::Gameplay => "Gameplay",
            Tag::Library => "Library",
            Tag::Utility => "Utility",
        }
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One moddable unit as listed in the mod links document.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub name: String,
    pub version: ModVersion,
    pub link: String,
    pub sha256: String,
    pub description: String,
    pub repository: String,
    pub dependencies: Vec<String>,
    pub integrations: Vec<String>,
    /// Raw tag tokens, unrecognized ones included.
    pub tags: Vec<String>,
    pub authors: Vec<String>,
}

/// The shared runtime component described by the API links document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiManifest {
    pub link: String,
    pub version: u32,
    pub sha256: String,
    pub files: Vec<String>,
}

/// Localized overlay data for a single mod. Blank fields are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayEntry {
    pub display_name: Option<String>,
    pub description_supplement: Option<String>,
}

impl OverlayEntry {
    pub fn new(display_name: &str, description_supplement: &str) -> Self {
        Self {
            display_name: non_blank(display_name),
            description_supplement: non_blank(description_supplement),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description_supplement.is_none()
    }
}

pub(crate) fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InstallState {
    NotInstalled,
    Installed {
        enabled: bool,
        #[serde(serialize_with = "serialize_display")]
        version: ModVersion,
        update_available: bool,
    },
}

impl InstallState {
    pub fn installed(enabled: bool, version: ModVersion) -> Self {
        InstallState::Installed {
            enabled,
            version,
            update_available: false,
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, InstallState::Installed { .. })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, InstallState::Installed { enabled: true, .. })
    }

    pub fn update_available(&self) -> bool {
        matches!(
            self,
            InstallState::Installed {
                update_available: true,
                ..
            }
        )
    }

    /// Recomputes the update flag against the version the manifest declares.
    pub fn against(self, latest: &ModVersion) -> Self {
        match self {
            InstallState::NotInstalled => InstallState::NotInstalled,
            InstallState::Installed {
                enabled, version, ..
            } => InstallState::Installed {
                enabled,
                update_available: version < *latest,
                version,
            },
        }
    }
}

/// A reconciled, user-facing catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub name: String,
    pub display_name: String,
    #[serde(serialize_with = "serialize_display")]
    pub version: ModVersion,
    pub link: String,
    pub sha256: String,
    pub description: String,
    pub repository: String,
    pub dependencies: Vec<String>,
    pub integrations: Vec<String>,
    pub authors: Vec<String>,
    pub tags: BTreeSet<Tag>,
    pub state: InstallState,
}

fn serialize_display<S: serde::Serializer>(v: &ModVersion, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}
