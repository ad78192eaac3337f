use serde::Serialize;

use super::Version;

/// One mod recorded in a save's mod-list record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SaveModEntry {
    pub name: String,
    pub version: Version,
    /// Four trailing bytes per entry whose meaning is unknown; kept verbatim.
    #[serde(skip_serializing)]
    pub reserved: [u8; 4],
}

/// The mods of one save file, keyed by the save's name (file name without `.zip`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SaveSummary {
    pub name: String,
    pub mods: Vec<SaveModEntry>,
}
