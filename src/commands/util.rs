use colored::{ColoredString, Colorize};
use itertools::Itertools;
use modcatalog::{CatalogItem, InstallState};

pub fn state_label(state: &InstallState) -> ColoredString {
    match state {
        InstallState::NotInstalled => "not installed".dimmed(),
        InstallState::Installed {
            enabled,
            version,
            update_available,
        } => {
            let label = format!(
                "installed {}{}",
                version,
                if *enabled { "" } else { " (disabled)" }
            );
            if *update_available {
                format!("{label}, update available").yellow().bold()
            } else if *enabled {
                label.green()
            } else {
                label.normal()
            }
        }
    }
}

/// Prints `title` in a heavy box with a branch leading to the lines below it.
pub fn print_title(title: &ColoredString, width: usize) {
    let title_corner = boxy::Char::upper_left(boxy::Weight::Thick);
    let title_side_h = boxy::Char::horizontal(boxy::Weight::Thick).to_string();
    let title_side_v = boxy::Char::vertical(boxy::Weight::Thick);
    let title_branch = boxy::Char::right_tee(boxy::Weight::Thick).down(boxy::Weight::Normal);

    println!(
        "{}{}{}",
        title_corner,
        title_side_h.repeat(width + 2),
        title_corner.rotate_cw(1)
    );
    println!("{} {} {}", title_side_v, title, title_side_v);
    println!(
        "{}{}{}",
        title_branch,
        title_side_h.repeat(width + 2),
        title_corner.rotate_cw(2)
    );
}

/// Prints labelled lines as branches of a tree. Empty values are skipped.
pub fn print_fields(fields: &[(&str, String)]) {
    let left_branch_more = boxy::Char::right_tee(boxy::Weight::Normal);
    let left_branch_done = boxy::Char::lower_left(boxy::Weight::Normal);
    let left_node = boxy::Char::left_half(boxy::Weight::Normal);

    let mut fields = fields.iter().filter(|(_, value)| !value.is_empty()).peekable();
    while let Some((label, value)) = fields.next() {
        println!(
            "{}{}{} {}",
            if fields.peek().is_some() {
                left_branch_more
            } else {
                left_branch_done
            },
            left_node,
            format!("{label}:").bold(),
            value
        );
    }
}

pub fn print_item(item: &CatalogItem) {
    let title = if item.state.update_available() {
        item.name.yellow().bold()
    } else if item.state.is_installed() {
        item.name.green().bold()
    } else {
        item.name.bold()
    };
    print_title(&title, item.name.chars().count());

    let display_name = if item.display_name != item.name {
        item.display_name.clone()
    } else {
        String::new()
    };
    print_fields(&[
        ("Name", display_name),
        ("Version", item.version.to_string()),
        ("State", state_label(&item.state).to_string()),
        ("Tags", item.tags.iter().join(", ")),
        ("Authors", item.authors.join(", ")),
        ("Dependencies", item.dependencies.join(", ")),
        ("Integrations", item.integrations.join(", ")),
        ("Repository", item.repository.clone()),
        ("Download", item.link.clone()),
        ("SHA256", item.sha256.clone()),
        ("Description", item.description.replace('\n', "\n   ")),
    ]);
}
