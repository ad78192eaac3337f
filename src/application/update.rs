//! Update action - checks installed packages against the portal and
//! downloads newer compatible releases.

use anyhow::Result;
use futures_util::future::try_join_all;
use log::info;
use serde::Serialize;

use crate::domain::model::{InstalledPackage, ModRequest, Version};
use crate::domain::service::{UpdateCheck, VersionResolver};
use crate::runtime::Runtime;

use super::InstallAction;

/// Result of checking (or updating) a single package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateReport {
    pub name: String,
    pub installed: Version,
    #[serde(flatten)]
    pub check: UpdateCheck,
}

/// Update action - resolves and applies updates
pub struct UpdateAction<'a, R: Runtime> {
    installer: &'a InstallAction<'a, R>,
    game_version: Version,
}

impl<'a, R: Runtime> UpdateAction<'a, R> {
    /// `game_version` of `0.0.0` accepts releases for any game version.
    pub fn new(installer: &'a InstallAction<'a, R>, game_version: Version) -> Self {
        Self {
            installer,
            game_version,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn check_update(&self, name: &str, installed: &Version) -> Result<UpdateReport> {
        let package = self.installer.portal().fetch_package(name).await?;
        let check =
            VersionResolver::check_for_update(installed, &package.releases, &self.game_version);

        Ok(UpdateReport {
            name: name.to_string(),
            installed: *installed,
            check,
        })
    }

    pub async fn check_updates(&self, packages: &[InstalledPackage]) -> Result<Vec<UpdateReport>> {
        try_join_all(
            packages
                .iter()
                .map(|p| self.check_update(&p.name, &p.version)),
        )
        .await
    }

    /// Check one package and download the newer release if there is one.
    #[tracing::instrument(skip(self))]
    pub async fn update_mod(&self, name: &str, installed: &Version) -> Result<UpdateReport> {
        let report = self.check_update(name, installed).await?;
        if let UpdateCheck::Available { version } = report.check {
            info!("Updating {} {} -> {}", name, installed, version);
            self.installer
                .download_mod(&ModRequest::pinned(name, version))
                .await?;
        }
        Ok(report)
    }

    pub async fn update_mods(&self, packages: &[InstalledPackage]) -> Result<Vec<UpdateReport>> {
        try_join_all(
            packages
                .iter()
                .map(|p| self.update_mod(&p.name, &p.version)),
        )
        .await
    }
}
