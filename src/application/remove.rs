//! Remove action - deletes package files by name and version pattern.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use log::warn;

use crate::archive::ArchiveReader;
use crate::domain::service::ModInventory;
use crate::runtime::Runtime;

/// Glob patterns selecting package files: `<name>[@<version>]`.
///
/// Both parts may contain glob wildcards. A missing version matches all versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovePattern {
    pub name: String,
    pub version: Option<String>,
}

impl FromStr for RemovePattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = match s.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (s, None),
        };
        if name.is_empty() || version.is_some_and(str::is_empty) {
            anyhow::bail!("Invalid pattern {:?}. Expected NAME or NAME@VERSION.", s);
        }
        Ok(Self {
            name: name.to_string(),
            version: version.map(String::from),
        })
    }
}

impl fmt::Display for RemovePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Remove action - deletes package files from the mod directory
pub struct RemoveAction<'a, R: Runtime> {
    inventory: ModInventory<'a, R>,
}

impl<'a, R: Runtime> RemoveAction<'a, R> {
    pub fn new(runtime: &'a R, archive: &'a dyn ArchiveReader, mod_dir: PathBuf) -> Self {
        Self {
            inventory: ModInventory::new(runtime, archive, mod_dir),
        }
    }

    /// Remove every file matching one pattern.
    pub fn remove_matching(&self, pattern: &RemovePattern) -> Result<Vec<PathBuf>> {
        self.inventory
            .remove_matching(&pattern.name, pattern.version.as_deref())
    }

    /// Remove every pattern. All patterns are processed; the first failure is
    /// returned afterwards and files already removed stay removed.
    pub fn remove_mods(&self, patterns: &[RemovePattern]) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        let mut first_error = None;

        for pattern in patterns {
            match self.remove_matching(pattern) {
                Ok(paths) => removed.extend(paths),
                Err(e) => {
                    warn!("Failed to remove {}: {}", pattern, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }
}
