use colored::Colorize;
use modcatalog::Catalog;

use super::util;

pub fn api(catalog: &Catalog) -> crate::Result<()> {
    let api = catalog.api();
    let title = format!("Modding API {}", api.version);
    util::print_title(&title.bold(), title.len());
    util::print_fields(&[
        ("Download", api.link.clone()),
        ("SHA256", api.sha256.clone()),
        ("Files", api.files.join(", ")),
        (
            "Fetched",
            catalog.fetched_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
    ]);
    Ok(())
}
