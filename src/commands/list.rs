use std::collections::HashSet;

use colored::Colorize;
use modcatalog::{Catalog, CatalogItem, Tag};

use super::util;

pub fn list(
    catalog: &Catalog,
    tags: &[Tag],
    search: Option<&str>,
    installed: bool,
    updates: bool,
    details: bool,
) -> crate::Result<()> {
    let found: Option<HashSet<&str>> =
        search.map(|query| catalog.search(query).map(|item| item.name.as_str()).collect());
    let mods: Vec<&CatalogItem> = catalog
        .with_tags(tags)
        .filter(|item| found.as_ref().map_or(true, |f| f.contains(item.name.as_str())))
        .filter(|item| !installed || item.state.is_installed())
        .filter(|item| !updates || item.state.update_available())
        .collect();

    if mods.is_empty() {
        eprintln!("No mods found!");
        return Ok(());
    }

    for item in mods {
        if details {
            util::print_item(item);
        } else if item.display_name != item.name {
            println!(
                "{} {} ({}) {}",
                item.name.bold(),
                item.version,
                item.display_name,
                util::state_label(&item.state)
            );
        } else {
            println!(
                "{} {} {}",
                item.name.bold(),
                item.version,
                util::state_label(&item.state)
            );
        }
    }
    Ok(())
}
