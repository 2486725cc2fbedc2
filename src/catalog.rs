//! Reconciliation of manifests, overlay and local install state into the
//! ordered, immutable [`Catalog`].

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    install::InstallStateResolver,
    model::{ApiManifest, CatalogItem, ManifestEntry, OverlayEntry, Tag},
    overlay::OverlayMap,
};

/// Separator placed between a manifest description and its overlay supplement.
pub const DESCRIPTION_SEPARATOR: &str = "\n\n";

/// One refresh cycle's result. Items are sorted by name, byte by byte.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    api: ApiManifest,
    fetched_at: DateTime<Local>,
}

/// Result of walking an item's dependency graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyClosure<'a> {
    /// Dependencies ordered so that each one precedes the mods needing it.
    pub resolved: Vec<&'a CatalogItem>,
    /// Dependency names that are not in the catalog.
    pub missing: Vec<String>,
}

impl Catalog {
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn api(&self) -> &ApiManifest {
        &self.api
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items
            .binary_search_by(|item| item.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.items[i])
    }

    /// Items carrying every tag in `tags`.
    pub fn with_tags<'a>(&'a self, tags: &'a [Tag]) -> impl Iterator<Item = &'a CatalogItem> {
        self.items
            .iter()
            .filter(move |item| tags.iter().all(|tag| item.tags.contains(tag)))
    }

    /// Case-insensitive search over name, display name and description.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CatalogItem> {
        let query = query.to_lowercase();
        self.items.iter().filter(move |item| {
            item.name.to_lowercase().contains(&query)
                || item.display_name.to_lowercase().contains(&query)
                || item.description.to_lowercase().contains(&query)
        })
    }

    pub fn installed(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.state.is_installed())
    }

    pub fn updates_available(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.state.update_available())
    }

    /// Transitive dependencies of `name`, dependency first. Cycles are cut at
    /// the first repeated name.
    pub fn dependencies_of(&self, name: &str) -> DependencyClosure<'_> {
        let mut closure = DependencyClosure::default();
        let mut visited = HashSet::new();
        visited.insert(name.to_string());
        if let Some(item) = self.get(name) {
            self.visit_dependencies(item, &mut visited, &mut closure);
        }
        closure
    }

    fn visit_dependencies<'a>(
        &'a self,
        item: &'a CatalogItem,
        visited: &mut HashSet<String>,
        closure: &mut DependencyClosure<'a>,
    ) {
        for dependency in &item.dependencies {
            if !visited.insert(dependency.clone()) {
                continue;
            }
            match self.get(dependency) {
                Some(dep) => {
                    self.visit_dependencies(dep, visited, closure);
                    closure.resolved.push(dep);
                }
                None => closure.missing.push(dependency.clone()),
            }
        }
    }
}

/// Maps raw tag tokens through the closed vocabulary, dropping unknown ones.
pub fn resolve_tags(raw: &[String]) -> BTreeSet<Tag> {
    raw.iter()
        .filter_map(|token| match token.parse::<Tag>() {
            Ok(tag) => Some(tag),
            Err(unknown) => {
                debug!("Ignoring unrecognized tag {}", unknown);
                None
            }
        })
        .collect()
}

pub fn resolve_display_name(name: &str, overlay: Option<&OverlayEntry>) -> String {
    overlay
        .and_then(|o| o.display_name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(name)
        .to_string()
}

/// Appends the overlay supplement to the manifest description.
///
/// Always starts from the raw manifest text, so rebuilding never appends twice.
pub fn merge_description(base: &str, supplement: Option<&str>) -> String {
    match supplement.filter(|s| !s.trim().is_empty()) {
        Some(supplement) if base.trim().is_empty() => supplement.to_string(),
        Some(supplement) => format!("{base}{DESCRIPTION_SEPARATOR}{supplement}"),
        None => base.to_string(),
    }
}

/// Builds the catalog for one refresh cycle.
///
/// Duplicate names in `entries` keep their first occurrence; later ones are
/// dropped with a warning.
pub fn reconcile(
    entries: &[ManifestEntry],
    api: ApiManifest,
    overlay: &OverlayMap,
    resolver: &dyn InstallStateResolver,
) -> Catalog {
    let mut seen = HashSet::with_capacity(entries.len());
    let items = entries
        .iter()
        .filter(|entry| {
            let first = seen.insert(entry.name.as_str());
            if !first {
                warn!("Duplicate manifest for {}, keeping the first one", entry.name);
            }
            first
        })
        .map(|entry| build_item(entry, overlay.get(&entry.name), resolver))
        .sorted_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()))
        .collect_vec();

    info!(
        "Catalog built with {} mods ({} localized)",
        items.len(),
        items.iter().filter(|i| overlay.contains_key(&i.name)).count()
    );

    Catalog {
        items,
        api,
        fetched_at: Local::now(),
    }
}

fn build_item(
    entry: &ManifestEntry,
    overlay: Option<&OverlayEntry>,
    resolver: &dyn InstallStateResolver,
) -> CatalogItem {
    let supplement = overlay.and_then(|o| o.description_supplement.as_deref());
    CatalogItem {
        name: entry.name.clone(),
        display_name: resolve_display_name(&entry.name, overlay),
        version: entry.version.clone(),
        link: entry.link.clone(),
        sha256: entry.sha256.clone(),
        description: merge_description(&entry.description, supplement),
        repository: entry.repository.clone(),
        dependencies: entry.dependencies.clone(),
        integrations: entry.integrations.clone(),
        authors: entry.authors.clone(),
        tags: resolve_tags(&entry.tags),
        state: resolver.resolve(entry).against(&entry.version),
    }
}
