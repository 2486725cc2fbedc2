//! Mod catalog acquisition and reconciliation.
//!
//! Fetches the ModLinks and ApiLinks manifests (with mirror fallback) and a
//! best-effort localization overlay, then reconciles them with local install
//! state into an ordered, immutable [`Catalog`].

pub mod catalog;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod install;
pub mod manifest;
pub mod model;
pub mod overlay;
pub mod service;
pub mod version;

pub use catalog::Catalog;
pub use error::{CatalogError, Document};
pub use install::{InstallStateResolver, InstalledMods};
pub use model::{ApiManifest, CatalogItem, InstallState, ManifestEntry, OverlayEntry, Tag};
pub use service::{CatalogService, Endpoints};
pub use version::ModVersion;
