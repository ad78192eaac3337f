use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Version;

/// A package file in the mod directory, identified by its `<name>_<version>.zip` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub name: String,
    pub version: Version,
    pub file_name: String,
}

impl PackageFile {
    /// Parse a file name of the form `<name>_<version>.zip`.
    ///
    /// The name/version split happens at the last underscore, so package
    /// names may themselves contain underscores.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".zip")?;
        let (name, version) = stem.rsplit_once('_')?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            version: version.parse().ok()?,
            file_name: file_name.to_string(),
        })
    }

    pub fn file_name_for(name: &str, version: &Version) -> String {
        format!("{}_{}.zip", name, version)
    }
}

/// The `info.json` descriptor shipped inside every package zip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModDescriptor {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub factorio_version: Option<Version>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// An installed package with its enablement state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub enabled: bool,
}

impl From<ModDescriptor> for InstalledPackage {
    fn from(d: ModDescriptor) -> Self {
        Self {
            name: d.name,
            version: d.version,
            title: d.title,
            enabled: true,
        }
    }
}

impl From<PackageFile> for InstalledPackage {
    fn from(f: PackageFile) -> Self {
        Self {
            name: f.name,
            version: f.version,
            title: None,
            enabled: true,
        }
    }
}

/// The persisted enable list (`mod-list.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModList {
    #[serde(default)]
    pub mods: Vec<ModListEntry>,
}

impl ModList {
    pub fn find(&self, name: &str) -> Option<&ModListEntry> {
        self.mods.iter().find(|m| m.name == name)
    }

    /// Update the entry for `name`, appending one if it does not exist.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        match self.mods.iter_mut().find(|m| m.name == name) {
            Some(entry) => entry.enabled = enabled,
            None => self.mods.push(ModListEntry {
                name: name.to_string(),
                enabled,
            }),
        }
    }
}

impl From<&[InstalledPackage]> for ModList {
    fn from(packages: &[InstalledPackage]) -> Self {
        Self {
            mods: packages
                .iter()
                .map(|p| ModListEntry {
                    name: p.name.clone(),
                    enabled: p.enabled,
                })
                .collect(),
        }
    }
}

/// One entry of the enable list.
///
/// `enabled` is written as the string `"true"` or `"false"`. Reading
/// accepts both strings and native booleans; any string other than `"true"`
/// reads as disabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModListEntry {
    pub name: String,
    #[serde(
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub enabled: bool,
}

fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s == "true",
    })
}
