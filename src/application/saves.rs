//! Save inspection - lists the mods a save was created with.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::archive::{ArchiveReader, SAVE_RECORD_ENTRY};
use crate::domain::model::{SaveModEntry, SaveSummary};
use crate::domain::service::SaveArchiveDecoder;
use crate::runtime::Runtime;

pub struct SaveInspector<'a, R: Runtime> {
    runtime: &'a R,
    archive: &'a dyn ArchiveReader,
    save_dir: PathBuf,
}

impl<'a, R: Runtime> SaveInspector<'a, R> {
    pub fn new(runtime: &'a R, archive: &'a dyn ArchiveReader, save_dir: PathBuf) -> Self {
        Self {
            runtime,
            archive,
            save_dir,
        }
    }

    /// Mods recorded in `<save_dir>/<file_name>`.
    #[tracing::instrument(skip(self))]
    pub fn mods_from_save_file(&self, file_name: &str) -> Result<Vec<SaveModEntry>> {
        let path = self.save_dir.join(file_name);
        let bytes = self
            .runtime
            .read(&path)
            .with_context(|| format!("Failed to read save {:?}", path))?;
        let record = self
            .archive
            .read_entry(&bytes, SAVE_RECORD_ENTRY)
            .with_context(|| format!("Failed to open save {}", file_name))?;

        let mods = SaveArchiveDecoder::decode(&record)
            .with_context(|| format!("Failed to decode {} in {}", SAVE_RECORD_ENTRY, file_name))?;
        debug!("{} uses {} mods", file_name, mods.len());
        Ok(mods)
    }

    /// Mods of the save named `save_name` (file name without `.zip`).
    pub fn mods_from_save(&self, save_name: &str) -> Result<SaveSummary> {
        let mods = self.mods_from_save_file(&format!("{}.zip", save_name))?;
        Ok(SaveSummary {
            name: save_name.to_string(),
            mods,
        })
    }

    /// Mods of every save in the save directory, in path order.
    pub fn mods_from_saves(&self) -> Result<Vec<SaveSummary>> {
        self.runtime
            .find(&self.save_dir, "*.zip")?
            .iter()
            .filter_map(|path| path.file_stem()?.to_str().map(String::from))
            .map(|name| self.mods_from_save(&name))
            .collect()
    }
}
