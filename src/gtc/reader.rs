//! GTC record decoder
//!
//! Decodes a record from a memory-mapped file or an in-memory buffer.
//! The prefix (magic, format version) is validated first, then each
//! table-of-contents entry is resolved through the field registry and its
//! payload decoded with bounds checking against the buffer length.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::error::{RecordError, Result};
use crate::gtc::{field_kind, FieldKind, FieldValue, GtcRecord, FORMAT, MAGIC, SIZE_PREFIX, SIZE_TOC_ENTRY};

impl GtcRecord {
    /// Decodes a record from a file path.
    ///
    /// The file is memory mapped and decoded in full; the map does not
    /// outlive the call.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(RecordError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_buffer(&mmap)
    }

    /// Decodes a record from an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The magic number or format version is incorrect
    /// * The table of contents names an unknown field identifier
    /// * Any payload extends past the end of the buffer
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < SIZE_PREFIX {
            return Err(RecordError::Truncated(buffer.len()).into());
        }
        let magic = [buffer[0], buffer[1], buffer[2]];
        if magic != MAGIC {
            return Err(RecordError::InvalidMagicNumber(magic).into());
        }
        let format = buffer[3];
        if format != FORMAT {
            return Err(RecordError::InvalidFormatVersion(format).into());
        }
        let count = LittleEndian::read_u32(&buffer[4..8]) as usize;

        let toc_end = SIZE_PREFIX + count * SIZE_TOC_ENTRY;
        if buffer.len() < toc_end {
            return Err(RecordError::Truncated(buffer.len()).into());
        }

        let mut record = GtcRecord::new();
        for entry in 0..count {
            let at = SIZE_PREFIX + entry * SIZE_TOC_ENTRY;
            let id = LittleEndian::read_u16(&buffer[at..at + 2]);
            let offset = LittleEndian::read_u32(&buffer[at + 2..at + 6]) as usize;
            let kind = field_kind(id).ok_or(RecordError::UnknownFieldId(id))?;
            record.insert(id, decode_payload(buffer, offset, kind)?);
        }
        Ok(record)
    }
}

/// Returns `len` bytes starting at `offset`, or a truncation error.
fn slice(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buffer
        .get(offset..offset + len)
        .ok_or_else(|| RecordError::Truncated(buffer.len()).into())
}

fn decode_payload(buffer: &[u8], offset: usize, kind: FieldKind) -> Result<FieldValue> {
    match kind {
        FieldKind::Str => {
            let len = LittleEndian::read_u16(slice(buffer, offset, 2)?) as usize;
            let bytes = slice(buffer, offset + 2, len)?;
            Ok(FieldValue::Str(std::str::from_utf8(bytes)?.to_string()))
        }
        FieldKind::U32 => {
            let value = LittleEndian::read_u32(slice(buffer, offset, 4)?);
            Ok(FieldValue::U32(value))
        }
        FieldKind::F32 => {
            let value = LittleEndian::read_f32(slice(buffer, offset, 4)?);
            Ok(FieldValue::F32(value))
        }
        FieldKind::U8Array => {
            let n = LittleEndian::read_u32(slice(buffer, offset, 4)?) as usize;
            let bytes = slice(buffer, offset + 4, n)?;
            Ok(FieldValue::U8Array(bytes.to_vec()))
        }
        FieldKind::U16Array => {
            let n = LittleEndian::read_u32(slice(buffer, offset, 4)?) as usize;
            let bytes = slice(buffer, offset + 4, n * 2)?;
            let mut values = vec![0u16; n];
            LittleEndian::read_u16_into(bytes, &mut values);
            Ok(FieldValue::U16Array(values))
        }
        FieldKind::U16Triple => {
            let bytes = slice(buffer, offset, 6)?;
            let mut values = [0u16; 3];
            LittleEndian::read_u16_into(bytes, &mut values);
            Ok(FieldValue::U16Triple(values))
        }
        FieldKind::F32Array => {
            let n = LittleEndian::read_u32(slice(buffer, offset, 4)?) as usize;
            let bytes = slice(buffer, offset + 4, n * 4)?;
            let mut values = vec![0f32; n];
            LittleEndian::read_f32_into(bytes, &mut values);
            Ok(FieldValue::F32Array(values))
        }
        FieldKind::CallArray => {
            let n = LittleEndian::read_u32(slice(buffer, offset, 4)?) as usize;
            let bytes = slice(buffer, offset + 4, n * 2)?;
            let calls = bytes
                .chunks_exact(2)
                .map(|pair| [pair[0], pair[1]])
                .collect();
            Ok(FieldValue::CallArray(calls))
        }
    }
}
