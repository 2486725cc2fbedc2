use colored::Colorize;
use modcatalog::Catalog;

use super::util;

pub fn info(catalog: &Catalog, name: &str) -> crate::Result<()> {
    let Some(item) = catalog.get(name) else {
        eprintln!("Mod not found: {}", name.bold().red());
        let suggestions: Vec<_> = catalog.search(name).map(|i| i.name.as_str()).collect();
        if !suggestions.is_empty() {
            eprintln!("Did you mean: {}", suggestions.join(", "));
        }
        return Err(std::io::Error::from(std::io::ErrorKind::NotFound).into());
    };
    util::print_item(item);

    let closure = catalog.dependencies_of(name);
    if !closure.resolved.is_empty() {
        println!();
        println!("{}", "Requires, in install order:".bold());
        for dependency in &closure.resolved {
            println!(
                "  {} {} {}",
                dependency.name,
                dependency.version,
                util::state_label(&dependency.state)
            );
        }
    }
    for missing in &closure.missing {
        eprintln!("Dependency {} is not in the catalog", missing.red());
    }
    Ok(())
}
