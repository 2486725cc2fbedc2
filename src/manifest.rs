//! Decoding of the ModLinks and ApiLinks XML documents.
//!
//! The raw serde shapes below mirror the documents one to one. They never
//! leave this module: [`parse_mod_links`] and [`parse_api_links`] are the
//! only boundary where malformed input is detected, and they hand out the
//! typed records from [`crate::model`].

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ParseError,
    model::{ApiManifest, ManifestEntry},
    version::ModVersion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Windows => "Windows",
            Platform::Mac => "Mac",
            Platform::Linux => "Linux",
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawModLinks {
    #[serde(rename = "Manifest", default)]
    manifests: Vec<RawModManifest>,
}

#[derive(Debug, Deserialize)]
struct RawModManifest {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Link")]
    link: Option<RawLink>,
    #[serde(rename = "Links")]
    links: Option<RawPlatformLinks>,
    #[serde(rename = "Repository", default)]
    repository: String,
    #[serde(rename = "Dependencies", default)]
    dependencies: RawDependencies,
    #[serde(rename = "Integrations", default)]
    integrations: RawIntegrations,
    #[serde(rename = "Tags", default)]
    tags: RawTags,
    #[serde(rename = "Authors", default)]
    authors: RawAuthors,
}

#[derive(Debug, Deserialize)]
struct RawApiLinks {
    #[serde(rename = "Manifest")]
    manifest: RawApiManifest,
}

#[derive(Debug, Deserialize)]
struct RawApiManifest {
    #[serde(rename = "Version")]
    version: u32,
    #[serde(rename = "Links")]
    links: RawPlatformLinks,
    #[serde(rename = "Files", default)]
    files: RawFiles,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLink {
    #[serde(rename = "@SHA256", default)]
    sha256: String,
    #[serde(rename = "$text", default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawPlatformLinks {
    #[serde(rename = "Windows")]
    windows: Option<RawLink>,
    #[serde(rename = "Mac")]
    mac: Option<RawLink>,
    #[serde(rename = "Linux")]
    linux: Option<RawLink>,
}

impl RawPlatformLinks {
    fn for_platform(&self, platform: Platform) -> Option<&RawLink> {
        match platform {
            Platform::Windows => self.windows.as_ref(),
            Platform::Mac => self.mac.as_ref(),
            Platform::Linux => self.linux.as_ref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencies {
    #[serde(rename = "Dependency", default)]
    items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIntegrations {
    #[serde(rename = "Integration", default)]
    items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTags {
    #[serde(rename = "Tag", default)]
    items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAuthors {
    #[serde(rename = "Author", default)]
    items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFiles {
    #[serde(rename = "File", default)]
    items: Vec<String>,
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Picks the download link for `platform`; a single `<Link>` serves every platform.
fn select_link(
    name: &str,
    link: Option<RawLink>,
    links: Option<&RawPlatformLinks>,
    platform: Platform,
) -> Result<(String, String), ParseError> {
    let chosen = link.or_else(|| links.and_then(|l| l.for_platform(platform)).cloned());
    match chosen {
        Some(link) if !link.url.trim().is_empty() => {
            Ok((link.url.trim().to_string(), link.sha256.trim().to_string()))
        }
        _ => Err(ParseError::MissingLink {
            name: name.to_string(),
            platform: platform.to_string(),
        }),
    }
}

impl RawModManifest {
    fn into_entry(self, platform: Platform) -> Result<ManifestEntry, ParseError> {
        let name = self.name.trim().to_string();
        let version =
            self.version
                .parse::<ModVersion>()
                .map_err(|source| ParseError::Version {
                    name: name.clone(),
                    source,
                })?;
        let (link, sha256) = select_link(&name, self.link, self.links.as_ref(), platform)?;
        Ok(ManifestEntry {
            version,
            link,
            sha256,
            description: self.description.trim().to_string(),
            repository: self.repository.trim().to_string(),
            dependencies: clean(self.dependencies.items),
            integrations: clean(self.integrations.items),
            tags: clean(self.tags.items),
            authors: clean(self.authors.items),
            name,
        })
    }
}

/// Parses the mod links document, keeping manifest order.
pub fn parse_mod_links(xml: &str, platform: Platform) -> Result<Vec<ManifestEntry>, ParseError> {
    let raw: RawModLinks = quick_xml::de::from_str(xml)?;
    let entries = raw
        .manifests
        .into_iter()
        .map(|m| m.into_entry(platform))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Parsed {} mod manifests", entries.len());
    Ok(entries)
}

/// Parses the API links document into its single runtime record.
pub fn parse_api_links(xml: &str, platform: Platform) -> Result<ApiManifest, ParseError> {
    let raw: RawApiLinks = quick_xml::de::from_str(xml)?;
    let manifest = raw.manifest;
    let (link, sha256) = select_link("API", None, Some(&manifest.links), platform)?;
    Ok(ApiManifest {
        link,
        version: manifest.version,
        sha256,
        files: clean(manifest.files.items),
    })
}
