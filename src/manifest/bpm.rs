//! Binary manifest reader
//!
//! The binary manifest defines every marker of an assay in design order.
//! Layout (little-endian):
//!
//! | Offset | Size | Name    | Description                   |
//! | ------ | ---- | ------- | ----------------------------- |
//! | 0      | 3    | magic   | `BPM` in ASCII                |
//! | 3      | 1    | format  | Format version (currently 1)  |
//! | 4      | 4    | count   | Number of markers             |
//!
//! Followed by one entry per marker: a u16 length-prefixed UTF-8 name,
//! the 3 snp-string bytes, and one ref-strand byte (1 = Plus, 2 = Minus).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;

use crate::error::{ManifestError, Result};
use crate::manifest::{RefStrand, SnpString};

/// Magic number identifying a binary manifest file
const MAGIC: [u8; 3] = *b"BPM";

/// Current format version of the binary manifest
const FORMAT: u8 = 1;

/// One marker definition as stored in the binary manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpmEntry {
    pub name: String,
    pub snp_string: SnpString,
    pub ref_strand: RefStrand,
}

/// The decoded binary manifest: marker definitions in design order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpmManifest {
    pub entries: Vec<BpmEntry>,
}

impl BpmManifest {
    /// Reads a binary manifest from a file path.
    ///
    /// The file is memory mapped and decoded in full; the map does not
    /// outlive the call.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(ManifestError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_buffer(&mmap)
    }

    /// Decodes a binary manifest from an in-memory buffer.
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        let mut cursor = buffer;
        Self::from_reader(&mut cursor)
    }

    /// Decodes a binary manifest from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The magic number or format version is incorrect
    /// * An entry carries an invalid snp string or ref strand byte
    /// * The reader ends before the declared marker count is reached
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 3];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(ManifestError::InvalidMagicNumber(magic).into());
        }
        let format = reader.read_u8()?;
        if format != FORMAT {
            return Err(ManifestError::InvalidFormatVersion(format).into());
        }

        let count = reader.read_u32::<LittleEndian>()? as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let name_len = reader.read_u16::<LittleEndian>()? as usize;
            let mut name_bytes = vec![0u8; name_len];
            reader.read_exact(&mut name_bytes)?;
            let name = std::str::from_utf8(&name_bytes)?.to_string();

            let mut snp_bytes = [0u8; 3];
            reader.read_exact(&mut snp_bytes)?;
            let snp_string = SnpString::from_bytes(snp_bytes)?;

            let strand_byte = reader.read_u8()?;
            let ref_strand = RefStrand::from_u8(strand_byte).ok_or_else(|| {
                ManifestError::InvalidRefStrand {
                    marker: name.clone(),
                    value: strand_byte,
                }
            })?;

            entries.push(BpmEntry {
                name,
                snp_string,
                ref_strand,
            });
        }
        Ok(Self { entries })
    }

    /// Writes the manifest to a writer in the binary layout.
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u8(FORMAT)?;
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;
        for entry in &self.entries {
            writer.write_u16::<LittleEndian>(entry.name.len() as u16)?;
            writer.write_all(entry.name.as_bytes())?;
            writer.write_all(entry.snp_string.as_bytes())?;
            writer.write_u8(entry.ref_strand.as_u8())?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample() -> BpmManifest {
        BpmManifest {
            entries: vec![
                BpmEntry {
                    name: "rs100".to_string(),
                    snp_string: SnpString::parse("A/G").unwrap(),
                    ref_strand: RefStrand::Plus,
                },
                BpmEntry {
                    name: "rs200".to_string(),
                    snp_string: SnpString::parse("I/D").unwrap(),
                    ref_strand: RefStrand::Minus,
                },
            ],
        }
    }

    #[test]
    fn roundtrip() -> Result<()> {
        let manifest = sample();
        let mut buffer = Vec::new();
        manifest.write_bytes(&mut buffer)?;
        let readout = BpmManifest::from_buffer(&buffer)?;
        assert_eq!(readout, manifest);
        Ok(())
    }

    #[test]
    fn rejects_bad_magic() -> Result<()> {
        let mut buffer = Vec::new();
        sample().write_bytes(&mut buffer)?;
        buffer[0] = b'X';
        assert!(matches!(
            BpmManifest::from_buffer(&buffer),
            Err(crate::Error::ManifestError(
                ManifestError::InvalidMagicNumber(_)
            ))
        ));
        Ok(())
    }

    #[test]
    fn rejects_bad_format_version() -> Result<()> {
        let mut buffer = Vec::new();
        sample().write_bytes(&mut buffer)?;
        buffer[3] = 9;
        assert!(matches!(
            BpmManifest::from_buffer(&buffer),
            Err(crate::Error::ManifestError(
                ManifestError::InvalidFormatVersion(9)
            ))
        ));
        Ok(())
    }

    #[test]
    fn rejects_bad_strand_byte() -> Result<()> {
        let mut buffer = Vec::new();
        sample().write_bytes(&mut buffer)?;
        let pos = buffer.len() - 1;
        buffer[pos] = 7;
        assert!(matches!(
            BpmManifest::from_buffer(&buffer),
            Err(crate::Error::ManifestError(
                ManifestError::InvalidRefStrand { value: 7, .. }
            ))
        ));
        Ok(())
    }
}
