use anyhow::{Result, bail};
use log::debug;

use crate::{
    application::{InstallAction, UpdateAction, UpdateReport},
    archive::ZipArchiveReader,
    config::Config,
    domain::{model::InstalledPackage, service::ModInventory},
    runtime::Runtime,
};

use super::{print_json, services};

/// Check installed packages for newer compatible releases.
///
/// With `apply`, the newer releases are downloaded as well, which needs a
/// session. An empty `names` checks every installed package.
#[tracing::instrument(skip(runtime, config))]
pub async fn check<R: Runtime>(
    runtime: R,
    config: Config,
    names: &[String],
    apply: bool,
    json: bool,
) -> Result<()> {
    let inventory = ModInventory::new(&runtime, &ZipArchiveReader, config.mod_dir.clone());
    let packages = select_installed(inventory.load_installed()?, names)?;
    if packages.is_empty() {
        println!("No mods installed.");
        return Ok(());
    }

    let http_client = services::build_http_client()?;
    let portal = services::build_portal(&config, &http_client);
    let session = if apply {
        services::build_session(&config, &http_client).await?
    } else {
        None
    };
    let downloader = services::build_downloader(&config, &http_client, session);

    let installer = InstallAction::new(
        &runtime,
        &ZipArchiveReader,
        &portal,
        &downloader,
        config.mod_dir.clone(),
        config.allow_multiple,
    );
    let updater = UpdateAction::new(&installer, config.game_version);

    debug!("Checking {} package(s)", packages.len());
    let reports = if apply {
        updater.update_mods(&packages).await?
    } else {
        updater.check_updates(&packages).await?
    };

    if json {
        return print_json(&reports);
    }
    for report in &reports {
        print_report(report, apply);
    }
    Ok(())
}

fn print_report(report: &UpdateReport, applied: bool) {
    match report.check.version() {
        Some(version) if applied => {
            println!("{}: updated {} -> {}", report.name, report.installed, version)
        }
        Some(version) => println!(
            "{}: {} -> {} available",
            report.name, report.installed, version
        ),
        None => println!("{}: {} is up to date", report.name, report.installed),
    }
}

/// Keep the packages named in `names`, or all of them when `names` is empty.
fn select_installed(
    installed: Vec<InstalledPackage>,
    names: &[String],
) -> Result<Vec<InstalledPackage>> {
    if names.is_empty() {
        return Ok(installed);
    }
    if let Some(missing) = names
        .iter()
        .find(|name| !installed.iter().any(|p| &p.name == *name))
    {
        bail!("Mod {} is not installed", missing);
    }
    Ok(installed
        .into_iter()
        .filter(|p| names.contains(&p.name))
        .collect())
}
