use anyhow::{Context, Result};
use log::debug;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::ArchiveReader;
use crate::error::ModError;

/// Reader for .zip archives
pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
    #[tracing::instrument(skip(self, archive))]
    fn read_entry(&self, archive: &[u8], entry_name: &str) -> Result<Vec<u8>> {
        let mut zip =
            ZipArchive::new(Cursor::new(archive)).context("Failed to parse ZIP archive")?;

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .with_context(|| format!("Failed to read ZIP entry {}", i))?;

            if entry.is_dir() {
                continue;
            }

            let matches = entry
                .enclosed_name()
                .and_then(|p| p.file_name().map(|n| n == entry_name))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            debug!("Reading {} from archive", entry.name());
            let mut buffer = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buffer)
                .with_context(|| format!("Failed to extract {}", entry_name))?;
            return Ok(buffer);
        }

        Err(ModError::MissingArchiveEntry {
            entry: entry_name.to_string(),
        }
        .into())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ::zip::CompressionMethod;
    use ::zip::ZipWriter;
    use ::zip::write::FileOptions;
    use std::io::Write;

    pub(crate) fn create_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_nested_entry() {
        let bytes = create_zip(&[
            ("Foreman_1.1.5/data.lua", b"-- data"),
            ("Foreman_1.1.5/info.json", br#"{"name":"Foreman"}"#),
        ]);

        let content = ZipArchiveReader.read_entry(&bytes, "info.json").unwrap();

        assert_eq!(content, br#"{"name":"Foreman"}"#);
    }

    #[test]
    fn test_read_top_level_entry() {
        let bytes = create_zip(&[("level-init.dat", &[1, 2, 3])]);
        let content = ZipArchiveReader.read_entry(&bytes, "level-init.dat").unwrap();
        assert_eq!(content, vec![1, 2, 3]);
    }

    #[test]
    fn test_name_must_match_whole_file_name() {
        let bytes = create_zip(&[("save/old-level-init.dat", b"x")]);

        let err = ZipArchiveReader
            .read_entry(&bytes, "level-init.dat")
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ModError>(),
            Some(ModError::MissingArchiveEntry { .. })
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let result = ZipArchiveReader.read_entry(b"definitely not a zip", "info.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse ZIP"));
    }
}
