use anyhow::Result;
use log::debug;

use crate::{
    application::{InstallAction, InstallResult},
    archive::ZipArchiveReader,
    config::Config,
    domain::model::ModRequest,
    runtime::Runtime,
};

use super::{print_json, services};

/// Install packages, optionally followed by their dependencies
#[tracing::instrument(skip(runtime, config))]
pub async fn install<R: Runtime>(
    runtime: R,
    config: Config,
    requests: &[ModRequest],
    with_deps: bool,
    include_optional: bool,
    json: bool,
) -> Result<()> {
    let http_client = services::build_http_client()?;
    let portal = services::build_portal(&config, &http_client);
    let session = services::build_session(&config, &http_client).await?;
    let downloader = services::build_downloader(&config, &http_client, session);

    let installer = InstallAction::new(
        &runtime,
        &ZipArchiveReader,
        &portal,
        &downloader,
        config.mod_dir.clone(),
        config.allow_multiple,
    );

    let mut results = installer.download_mods(requests).await?;
    if with_deps {
        for request in requests {
            debug!("Installing dependencies of {}", request);
            results.extend(
                installer
                    .download_dependencies(request, include_optional)
                    .await?,
            );
        }
    }

    if json {
        return print_json(&results);
    }
    for result in &results {
        print_installed(result);
    }
    Ok(())
}

/// Print the dependencies of the release a request resolves to
#[tracing::instrument(skip(runtime, config))]
pub async fn deps<R: Runtime>(
    runtime: R,
    config: Config,
    request: &ModRequest,
    include_optional: bool,
    json: bool,
) -> Result<()> {
    let http_client = services::build_http_client()?;
    let portal = services::build_portal(&config, &http_client);
    // Listing dependencies never downloads
    let downloader = services::build_downloader(&config, &http_client, None);

    let installer = InstallAction::new(
        &runtime,
        &ZipArchiveReader,
        &portal,
        &downloader,
        config.mod_dir.clone(),
        config.allow_multiple,
    );
    let dependencies = installer.dependencies(request, include_optional).await?;

    if json {
        return print_json(&dependencies);
    }
    if dependencies.is_empty() {
        println!("{} has no dependencies.", request);
    }
    for dependency in &dependencies {
        println!("{}", dependency);
    }
    Ok(())
}

fn print_installed(result: &InstallResult) {
    println!("Installed {} {} ({})", result.name, result.version, result.file_name);
}
