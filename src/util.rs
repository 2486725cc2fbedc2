use std::path::PathBuf;

use tracing::{debug, info};
use tracing_unwrap::OptionExt;

/// Location of the install state file when none is given on the command line.
pub fn default_state_file() -> crate::Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .expect_or_log("Failed to get user data directory")
        .join("modcatalog");
    if !data_dir.is_dir() {
        info!("Creating data directory");
        std::fs::create_dir_all(&data_dir)?;
    }
    let path = data_dir.join("installed.json");
    debug!("Install state path: {}", path.display());
    Ok(path)
}
