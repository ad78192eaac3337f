//! Decoder for the mod-list record stored in a save's `level-init.dat`.
//!
//! Layout:
//!
//! ```text
//! offset 48        u8   mod count
//! offset 52..      entries, repeated `mod count` times:
//!                    u8        name length (n)
//!                    n bytes   UTF-8 name
//!                    u8 x 3    major, minor, patch
//!                    4 bytes   reserved
//! ```
//!
//! Each entry therefore occupies `n + 8` bytes.

use log::debug;

use crate::domain::model::{SaveModEntry, Version};
use crate::error::ModError;

const MOD_COUNT_OFFSET: usize = 48;
const FIRST_ENTRY_OFFSET: usize = 52;
const RESERVED_LEN: usize = 4;

pub struct SaveArchiveDecoder;

impl SaveArchiveDecoder {
    /// Decode the record into its mod entries, in record order.
    ///
    /// Fails with `MalformedRecord` when the buffer is too short for the
    /// counts and lengths it declares, or a name is not valid UTF-8.
    pub fn decode(buffer: &[u8]) -> Result<Vec<SaveModEntry>, ModError> {
        let mut reader = RecordReader::new(buffer);

        reader.seek(MOD_COUNT_OFFSET);
        let mod_count = reader.read_u8("mod count")?;
        debug!("Save record declares {} mods", mod_count);

        reader.seek(FIRST_ENTRY_OFFSET);
        let mut entries = Vec::with_capacity(mod_count as usize);
        for _ in 0..mod_count {
            entries.push(Self::read_entry(&mut reader)?);
        }
        Ok(entries)
    }

    fn read_entry(reader: &mut RecordReader<'_>) -> Result<SaveModEntry, ModError> {
        let name_offset = reader.position();
        let name_len = reader.read_u8("name length")? as usize;
        let name_bytes = reader.read_bytes(name_len, "name")?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|e| ModError::malformed(name_offset + 1, format!("name is not UTF-8: {}", e)))?
            .to_string();

        let version = reader.read_bytes(3, "version")?;
        let version = Version::new(version[0].into(), version[1].into(), version[2].into());

        let mut reserved = [0u8; RESERVED_LEN];
        reserved.copy_from_slice(reader.read_bytes(RESERVED_LEN, "reserved bytes")?);

        Ok(SaveModEntry {
            name,
            version,
            reserved,
        })
    }
}

/// Bounds-checked cursor over the record bytes.
struct RecordReader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn read_u8(&mut self, what: &str) -> Result<u8, ModError> {
        Ok(self.read_bytes(1, what)?[0])
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], ModError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                ModError::malformed(
                    self.pos,
                    format!(
                        "{} needs {} bytes but buffer has {}",
                        what,
                        len,
                        self.buffer.len().saturating_sub(self.pos)
                    ),
                )
            })?;
        let bytes = &self.buffer[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}
