//! # gtc
//!
//! Decoder and encoder for GTC records: the per-sample result set of a
//! genotyping assay run (genotype codes, base calls, intensities, scores,
//! and scalar sample metadata).
//!
//! ## GTC file format
//!
//! A GTC record file consists of three sections:
//!
//! 1. Fixed-size prefix (8 bytes)
//! 2. Table of contents
//! 3. Field payloads
//!
//! ### Prefix (8 bytes total)
//!
//! | Offset | Size (bytes) | Name   | Description                  | Type   |
//! | ------ | ------------ | ------ | ---------------------------- | ------ |
//! | 0      | 3            | magic  | `gtc` in ASCII               | bytes  |
//! | 3      | 1            | format | Format version (currently 3) | uint8  |
//! | 4      | 4            | count  | Number of fields             | uint32 |
//!
//! ### Table of contents
//!
//! `count` entries of 6 bytes each: a uint16 field identifier followed by
//! the uint32 absolute byte offset of the field's payload. All integers
//! are little-endian.
//!
//! ### Payloads
//!
//! The payload kind is fixed per field identifier (see [`field_id`]):
//!
//! - strings: uint16 length followed by UTF-8 bytes
//! - uint32 / float32 scalars: 4 raw bytes
//! - arrays: uint32 element count followed by packed elements
//!   (uint8, uint16, float32, or 2-byte base-call pairs)
//! - percentile summaries: three uint16 values (5th, 50th, 95th)
//!
//! ## Per-marker arrays
//!
//! The genotype (1002) and base-call (1003) arrays are indexed by marker
//! design position and are the only per-marker arrays an edit may touch;
//! the genotype code and base-call string at an index are always jointly
//! consistent (see [`GenotypeCode`]). Every other field round-trips
//! byte-identically through decode and encode.

mod reader;
mod record;
mod writer;

pub use record::{FieldValue, GenotypeCode, GtcRecord, NO_CALL_BASES};

/// Magic number identifying a GTC record file
pub(crate) const MAGIC: [u8; 3] = *b"gtc";

/// Current format version of the GTC record file format
pub(crate) const FORMAT: u8 = 3;

/// Size of the fixed prefix in bytes
pub(crate) const SIZE_PREFIX: usize = 8;

/// Size of one table-of-contents entry in bytes
pub(crate) const SIZE_TOC_ENTRY: usize = 6;

/// Field identifiers of the GTC record format.
///
/// The numeric values are wire-visible and shared with the upstream
/// genotyping tooling; they must be reproduced exactly.
pub mod field_id {
    pub const NUM_SNPS: u16 = 1;
    pub const SAMPLE_NAME: u16 = 10;
    pub const SAMPLE_PLATE: u16 = 11;
    pub const SAMPLE_WELL: u16 = 12;
    pub const CLUSTER_FILE: u16 = 100;
    pub const SNP_MANIFEST: u16 = 101;
    pub const IMAGING_DATE: u16 = 200;
    pub const AUTOCALL_DATE: u16 = 201;
    pub const AUTOCALL_VERSION: u16 = 300;
    pub const CONTROLS_X: u16 = 500;
    pub const CONTROLS_Y: u16 = 501;
    pub const RAW_X: u16 = 1000;
    pub const RAW_Y: u16 = 1001;
    pub const GENOTYPES: u16 = 1002;
    pub const BASE_CALLS: u16 = 1003;
    pub const GENOTYPE_SCORES: u16 = 1004;
    pub const CALL_RATE: u16 = 1006;
    pub const GENDER: u16 = 1007;
    pub const LOGR_DEV: u16 = 1008;
    pub const GC10: u16 = 1009;
    pub const GC50: u16 = 1011;
    pub const B_ALLELE_FREQS: u16 = 1012;
    pub const LOGR_RATIOS: u16 = 1013;
    pub const PERCENTILES_X: u16 = 1014;
    pub const PERCENTILES_Y: u16 = 1015;
    pub const SENTRIX_BARCODE: u16 = 1016;
}

/// Payload kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    U32,
    F32,
    U8Array,
    U16Array,
    U16Triple,
    F32Array,
    CallArray,
}

impl FieldKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::U32 => "uint32",
            Self::F32 => "float32",
            Self::U8Array => "uint8 array",
            Self::U16Array => "uint16 array",
            Self::U16Triple => "uint16 triple",
            Self::F32Array => "float32 array",
            Self::CallArray => "base-call array",
        }
    }
}

/// The payload kind fixed by a field identifier.
///
/// Returns `None` for identifiers outside the registry.
#[must_use]
pub fn field_kind(id: u16) -> Option<FieldKind> {
    use field_id::*;
    match id {
        NUM_SNPS => Some(FieldKind::U32),
        SAMPLE_NAME | SAMPLE_PLATE | SAMPLE_WELL | CLUSTER_FILE | SNP_MANIFEST | IMAGING_DATE
        | AUTOCALL_DATE | AUTOCALL_VERSION | GENDER | SENTRIX_BARCODE => Some(FieldKind::Str),
        CONTROLS_X | CONTROLS_Y | RAW_X | RAW_Y => Some(FieldKind::U16Array),
        GENOTYPES => Some(FieldKind::U8Array),
        BASE_CALLS => Some(FieldKind::CallArray),
        GENOTYPE_SCORES | B_ALLELE_FREQS | LOGR_RATIOS => Some(FieldKind::F32Array),
        CALL_RATE | LOGR_DEV | GC10 | GC50 => Some(FieldKind::F32),
        PERCENTILES_X | PERCENTILES_Y => Some(FieldKind::U16Triple),
        _ => None,
    }
}
