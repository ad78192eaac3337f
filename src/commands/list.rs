use anyhow::Result;
use log::debug;

use crate::{
    archive::ZipArchiveReader, config::Config, domain::service::ModInventory, runtime::Runtime,
};

use super::print_json;

/// List installed packages with their enabled state
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: Config, json: bool) -> Result<()> {
    let inventory = ModInventory::new(&runtime, &ZipArchiveReader, config.mod_dir);
    let installed = inventory.load_installed()?;
    debug!("Found {} package(s)", installed.len());

    if json {
        return print_json(&installed);
    }
    if installed.is_empty() {
        println!("No mods installed.");
        return Ok(());
    }

    for package in &installed {
        let state = if package.enabled { "" } else { " (disabled)" };
        println!("{} {}{}", package.name, package.version, state);
    }
    Ok(())
}

/// Enable or disable packages in `mod-list.json`
#[tracing::instrument(skip(runtime, config))]
pub fn set_enabled<R: Runtime>(
    runtime: R,
    config: Config,
    names: &[String],
    enabled: bool,
) -> Result<()> {
    let inventory = ModInventory::new(&runtime, &ZipArchiveReader, config.mod_dir);
    for name in names {
        inventory.set_enabled(name, enabled)?;
        println!("{} {}", if enabled { "Enabled" } else { "Disabled" }, name);
    }
    Ok(())
}
