//! Factorio mod portal client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::domain::model::{Package, Release, Version};
use crate::http::{HttpClient, into_mod_error};

use super::{ModPortal, SearchQuery};

pub const DEFAULT_PORTAL_URL: &str = "https://mods.factorio.com";

/// Portal API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Mod {
        pub name: String,
        pub title: Option<String>,
        pub owner: Option<String>,
        pub summary: Option<String>,
        #[serde(default)]
        pub releases: Vec<Release>,
        /// Only present in search results
        pub latest_release: Option<Release>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub version: String,
        pub download_url: String,
        #[serde(default)]
        pub file_name: String,
        pub released_at: Option<String>,
        /// Older portal responses carry the game version on the release itself
        pub factorio_version: Option<String>,
        pub info_json: Option<InfoJson>,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct InfoJson {
        pub factorio_version: Option<String>,
        #[serde(default)]
        pub dependencies: Vec<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchResults {
        #[serde(default)]
        pub results: Vec<Mod>,
    }
}

/// Client for the mod portal's JSON API.
pub struct FactorioPortal {
    http_client: HttpClient,
    base_url: String,
}

impl FactorioPortal {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModPortal for FactorioPortal {
    #[tracing::instrument(skip(self))]
    async fn fetch_package(&self, name: &str) -> Result<Package> {
        let url = format!("{}/api/mods/{}/full", self.base_url, name);
        debug!("Fetching package {} from {}...", name, url);

        let raw: api::Mod = self
            .http_client
            .get_json(&url)
            .await
            .map_err(|e| into_mod_error(e, name))?;

        Package::try_from(raw).with_context(|| format!("Invalid portal data for {}", name))
    }

    #[tracing::instrument(skip(self))]
    async fn search_packages(&self, query: &SearchQuery) -> Result<Vec<Package>> {
        let url = format!("{}/api/mods", self.base_url);
        let params = query.to_params();
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let raw: api::SearchResults = self
            .http_client
            .get_json_with_query(&url, &params)
            .await
            .context("Failed to search the mod portal")?;

        raw.results.into_iter().map(Package::try_from).collect()
    }
}

impl TryFrom<api::Mod> for Package {
    type Error = anyhow::Error;

    fn try_from(m: api::Mod) -> Result<Self> {
        let mut raw_releases = m.releases;
        if raw_releases.is_empty()
            && let Some(latest) = m.latest_release
        {
            raw_releases.push(latest);
        }

        Ok(Package {
            name: m.name,
            title: m.title,
            owner: m.owner,
            summary: m.summary,
            releases: raw_releases
                .into_iter()
                .map(Release::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

impl TryFrom<api::Release> for Release {
    type Error = anyhow::Error;

    fn try_from(r: api::Release) -> Result<Self> {
        let info = r.info_json.unwrap_or_default();
        let game_version = match r.factorio_version.or(info.factorio_version) {
            Some(v) => v.parse()?,
            None => Version::ZERO,
        };

        Ok(Release {
            version: r.version.parse()?,
            game_version,
            download_url: r.download_url,
            file_name: r.file_name,
            dependencies: info.dependencies,
            released_at: r.released_at,
        })
    }
}
