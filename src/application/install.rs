//! Install action - downloads packages and their dependencies.
//!
//! This action coordinates:
//! - Fetching package metadata from the portal
//! - Choosing the release to download
//! - Writing the file and enforcing one version per package
//! - Expanding dependency declarations into install requests

use std::path::PathBuf;

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use log::{debug, info};
use serde::Serialize;

use crate::archive::ArchiveReader;
use crate::domain::model::{ModRequest, PackageFile, Release, Version};
use crate::domain::service::{DependencyParser, ModInventory, VersionResolver};
use crate::download::Downloader;
use crate::portal::ModPortal;
use crate::runtime::Runtime;

/// A package file written to the mod directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallResult {
    pub name: String,
    pub version: Version,
    pub file_name: String,
}

/// Install action - downloads releases into the mod directory
pub struct InstallAction<'a, R: Runtime> {
    portal: &'a dyn ModPortal,
    downloader: &'a dyn Downloader,
    inventory: ModInventory<'a, R>,
    allow_multiple: bool,
}

impl<'a, R: Runtime> InstallAction<'a, R> {
    pub fn new(
        runtime: &'a R,
        archive: &'a dyn ArchiveReader,
        portal: &'a dyn ModPortal,
        downloader: &'a dyn Downloader,
        mod_dir: PathBuf,
        allow_multiple: bool,
    ) -> Self {
        Self {
            portal,
            downloader,
            inventory: ModInventory::new(runtime, archive, mod_dir),
            allow_multiple,
        }
    }

    pub fn portal(&self) -> &'a dyn ModPortal {
        self.portal
    }

    /// Download the requested version of a package, or its latest release.
    #[tracing::instrument(skip(self))]
    pub async fn download_mod(&self, request: &ModRequest) -> Result<InstallResult> {
        let package = self.portal.fetch_package(&request.name).await?;
        let release = VersionResolver::select_release_to_download(
            &package.name,
            &package.releases,
            request.version.as_ref(),
        )?;

        let file_name = release.target_file_name();
        let name = self.download_release(release).await?;

        Ok(InstallResult {
            name,
            version: release.version,
            file_name,
        })
    }

    /// Download every request concurrently. Fails if any download fails;
    /// files already written stay in place.
    pub async fn download_mods(&self, requests: &[ModRequest]) -> Result<Vec<InstallResult>> {
        try_join_all(requests.iter().map(|r| self.download_mod(r))).await
    }

    /// Download one release, store it, and remove other versions of the same
    /// package unless multiple versions are allowed. Returns the package name.
    #[tracing::instrument(skip(self, release), fields(url = %release.download_url))]
    pub async fn download_release(&self, release: &Release) -> Result<String> {
        let file_name = release.target_file_name();
        if file_name.is_empty() {
            anyhow::bail!(
                "Cannot derive a file name from download reference {:?}",
                release.download_url
            );
        }

        let bytes = self
            .downloader
            .download(&release.download_url)
            .await
            .with_context(|| format!("Failed to download {}", file_name))?;
        self.inventory.write_package(&file_name, &bytes)?;

        let name = package_name_of(&file_name);
        let removed = self
            .inventory
            .enforce_single_version(&name, &file_name, self.allow_multiple)?;
        if !removed.is_empty() {
            debug!("Removed {} older file(s) of {}", removed.len(), name);
        }

        info!("Installed {}", file_name);
        Ok(name)
    }

    /// Packages the chosen release of `request` depends on.
    #[tracing::instrument(skip(self))]
    pub async fn dependencies(
        &self,
        request: &ModRequest,
        include_optional: bool,
    ) -> Result<Vec<ModRequest>> {
        let package = self.portal.fetch_package(&request.name).await?;
        let release = VersionResolver::select_release_to_download(
            &package.name,
            &package.releases,
            request.version.as_ref(),
        )?;

        Ok(DependencyParser::resolve_set(
            &release.dependencies,
            include_optional,
        )?)
    }

    /// Download the latest release of every dependency of `request`.
    pub async fn download_dependencies(
        &self,
        request: &ModRequest,
        include_optional: bool,
    ) -> Result<Vec<InstallResult>> {
        let dependencies = self.dependencies(request, include_optional).await?;
        self.download_mods(&dependencies).await
    }
}

/// Package name for a stored file: everything before the last `_`.
fn package_name_of(file_name: &str) -> String {
    if let Some(file) = PackageFile::parse(file_name) {
        return file.name;
    }
    let stem = file_name.strip_suffix(".zip").unwrap_or(file_name);
    stem.rsplit_once('_')
        .map_or(stem, |(name, _)| name)
        .to_string()
}
