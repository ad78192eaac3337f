use anyhow::Result;
use log::debug;

use crate::application::{RemoveAction, RemovePattern};
use crate::archive::ZipArchiveReader;
use crate::config::Config;
use crate::runtime::Runtime;

/// Remove package files matching `<name>[@<version>]` glob patterns
#[tracing::instrument(skip(runtime, config))]
pub fn remove<R: Runtime>(runtime: R, config: Config, patterns: &[RemovePattern]) -> Result<()> {
    debug!("Removing from {:?}", config.mod_dir);

    let action = RemoveAction::new(&runtime, &ZipArchiveReader, config.mod_dir);
    let removed = action.remove_mods(patterns)?;

    if removed.is_empty() {
        println!("No matching mod files.");
    }
    for path in removed {
        println!("Removed {}", path.display());
    }
    Ok(())
}
