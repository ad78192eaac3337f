use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::error::ModError;

/// One published version of a package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Release {
    pub version: Version,
    /// Game version band this release targets, normalized like `version`
    pub game_version: Version,
    /// Opaque locator handed to the downloader (e.g. `/download/Foreman/5a5f1ae6adcc441024d72b60`)
    pub download_url: String,
    /// File name the package is stored under (e.g. `Foreman_1.1.5.zip`)
    #[serde(default)]
    pub file_name: String,
    /// Raw dependency declarations, in declaration order
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub released_at: Option<String>,
}

impl Release {
    /// File name to store the download under.
    ///
    /// Falls back to the last path segment of the download locator when the
    /// source did not provide one.
    pub fn target_file_name(&self) -> String {
        if !self.file_name.is_empty() {
            return self.file_name.clone();
        }
        let path = self
            .download_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default().to_string()
    }
}

/// A mod as known by the metadata source.
///
/// Releases are a read-only snapshot, ordered most-recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// A request to install (or look up) a package, optionally pinned to a version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl ModRequest {
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn pinned(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }
}

/// Parses `<name>` or `<name>@<version>`.
impl FromStr for ModRequest {
    type Err = ModError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((name, version)) if !name.is_empty() => {
                Ok(Self::pinned(name, version.parse()?))
            }
            None if !s.is_empty() => Ok(Self::latest(s)),
            _ => Err(ModError::InvalidDependency {
                declaration: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}
