mod commands;
mod util;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use std::{path::PathBuf, str::FromStr, sync::Arc};

use clap::{Parser, Subcommand};
use colored::Colorize;
use modcatalog::{fetch::HttpTransport, CatalogService, Endpoints, InstalledMods, Tag};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Browse the Hollow Knight mod catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Install state file kept by the installer
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lists mods in the catalog
    List {
        /// Only show mods carrying all of the given tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Only show mods matching the given text
        #[arg(short, long)]
        search: Option<String>,

        /// Only show installed mods
        #[arg(short, long)]
        installed: bool,

        /// Only show installed mods with an update available
        #[arg(short, long)]
        updates: bool,

        /// Show detailed information
        #[arg(short, long)]
        details: bool,
    },
    /// Shows one mod and everything it depends on
    Info {
        /// Mod name, as listed in the catalog
        name: String,
    },
    /// Shows the modding API download
    Api,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting modcatalog version {}", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();

    let tags = match &args.command {
        Command::List {
            tags: Some(tags), ..
        } => match tags.iter().map(|t| Tag::from_str(t)).collect::<std::result::Result<Vec<_>, _>>() {
            Ok(tags) => tags,
            Err(unknown) => {
                eprintln!(
                    "Unknown tag {}. Known tags: {}",
                    unknown.bold().red(),
                    itertools::join(Tag::ALL, ", ")
                );
                std::process::exit(1);
            }
        },
        _ => Vec::new(),
    };

    let state_file = match args.state_file {
        Some(path) => path,
        None => util::default_state_file()?,
    };
    let installed = InstalledMods::load(&state_file).await?;
    let service = CatalogService::new(
        Arc::new(HttpTransport::new()?),
        Arc::new(installed),
        Endpoints::official()?,
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling refresh");
            interrupt.cancel();
        }
    });

    let catalog = match service.refresh(&cancel).await {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("{}", e.user_message().bold().red());
            return Err(e.into());
        }
    };

    match args.command {
        Command::List {
            search,
            installed,
            updates,
            details,
            ..
        } => commands::list(&catalog, &tags, search.as_deref(), installed, updates, details),
        Command::Info { name } => commands::info(&catalog, &name),
        Command::Api => commands::api(&catalog),
    }
}
