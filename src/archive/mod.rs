mod zip;

use anyhow::Result;

pub use zip::ZipArchiveReader;

/// Entry inside a package zip that describes the package.
pub const DESCRIPTOR_ENTRY: &str = "info.json";

/// Entry inside a save zip that holds the mod-list record.
pub const SAVE_RECORD_ENTRY: &str = "level-init.dat";

/// Trait for reading single entries out of archive bytes
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveReader: Send + Sync {
    /// Return the bytes of the first entry whose file name is `entry_name`,
    /// at any directory depth.
    ///
    /// Fails with `ModError::MissingArchiveEntry` when no entry matches.
    fn read_entry(&self, archive: &[u8], entry_name: &str) -> Result<Vec<u8>>;
}
