/// Custom Result type for gtcedit operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the gtcedit library, encompassing all possible error cases
/// that can occur while loading manifests, parsing update scripts, decoding and
/// encoding GTC records, and resolving requested allele changes.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to loading and pairing the probe manifests
    ManifestError(#[from] ManifestError),
    /// Errors that occur while parsing an update script
    ScriptError(#[from] ScriptError),
    /// Errors that occur while decoding or encoding a GTC record
    RecordError(#[from] RecordError),
    /// Errors that occur while resolving a requested allele change
    EditError(#[from] EditError),
    /// Errors related to run configuration
    ConfigError(#[from] ConfigError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Errors specific to loading the binary manifest, the auxiliary CSV manifest,
/// and pairing the two into a single marker model
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    /// The magic number of the binary manifest does not match the expected value
    #[error("Invalid manifest magic number: {0:?}")]
    InvalidMagicNumber([u8; 3]),

    /// The format version of the binary manifest is not supported
    #[error("Invalid manifest format version: {0}")]
    InvalidFormatVersion(u8),

    /// A marker's snp string is not a valid 3-character `x/y` definition
    #[error("Invalid snp string: {0:?}")]
    InvalidSnpString(String),

    /// A marker's ref strand byte is outside the known values
    #[error("Invalid ref strand value ({value}) for marker {marker}")]
    InvalidRefStrand { marker: String, value: u8 },

    /// The binary manifest and the CSV manifest disagree on a marker name
    ///
    /// This is a fatal configuration error for the run: the two sources must
    /// list the same markers in the same order.
    #[error("Manifest name mismatch at index {index}: binary manifest has {bpm}, csv manifest has {csv}")]
    NameMismatch {
        index: usize,
        bpm: String,
        csv: String,
    },

    /// The binary manifest and the CSV manifest have different marker counts
    #[error("Manifest length mismatch: binary manifest has {bpm} markers, csv manifest has {csv}")]
    LengthMismatch { bpm: usize, csv: usize },

    /// A required column is missing from the CSV manifest header row
    #[error("Missing required column in csv manifest: {0}")]
    MissingColumn(&'static str),

    /// The manifest file is not a regular file (e.g. a directory or special file)
    #[error("Manifest file is not regular")]
    IncompatibleFile,

    /// Errors raised by the underlying CSV parser
    #[error("Csv parsing error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Errors that can occur while parsing an update script
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    /// An edit line was found before any block header
    #[error("Edit line before any block header at line {0}")]
    MissingHeader(usize),

    /// A block header does not carry the expected fields
    #[error("Invalid block header at line {line}: {content:?}")]
    InvalidHeader { line: usize, content: String },

    /// An edit line does not split into a marker name and an allele token
    #[error("Invalid edit line at line {line}: {content:?}")]
    InvalidEditLine { line: usize, content: String },

    /// An allele token is not exactly two characters
    #[error("Invalid allele token at line {line}: {token:?}")]
    InvalidAlleles { line: usize, token: String },
}

/// Errors that can occur while decoding or encoding a GTC record
#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    /// The magic number of the record does not match the expected value
    #[error("Invalid record magic number: {0:?}")]
    InvalidMagicNumber([u8; 3]),

    /// The format version of the record is not supported
    #[error("Invalid record format version: {0}")]
    InvalidFormatVersion(u8),

    /// The record data ends before a field payload does - possibly truncated
    #[error("Record data does not match expectation - possibly truncated at byte pos {0}")]
    Truncated(usize),

    /// The table of contents names a field identifier outside the registry
    #[error("Unknown field identifier: {0}")]
    UnknownFieldId(u16),

    /// A field expected on the record is absent
    #[error("Missing field identifier: {0}")]
    MissingField(u16),

    /// A field holds a different payload kind than its identifier implies
    #[error("Field {id} does not hold a {expected} payload")]
    FieldKindMismatch { id: u16, expected: &'static str },

    /// A requested per-marker index is beyond the record's array length
    #[error("Requested marker index ({index}) is out of array range ({len})")]
    OutOfRange { index: usize, len: usize },

    /// The record file is not a regular file (e.g. a directory or special file)
    #[error("Record file is not regular")]
    IncompatibleFile,

    /// A string payload is not valid UTF-8
    #[error("Invalid string payload: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur while resolving a requested allele change against
/// a marker definition
///
/// These abort the current batch (the output file is not produced) but never
/// the remainder of the run.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    /// The requested marker name does not exist in the manifest
    #[error("Unknown marker name: {0}")]
    UnknownMarker(String),

    /// The requested pair matches no classification branch, directly or
    /// through its strand complement
    #[error("Unresolvable allele pair {requested:?} for marker {marker}")]
    UnresolvablePair { marker: String, requested: String },

    /// A requested allele is outside the strand complement table
    #[error("Unsupported allele symbol {allele:?} for marker {marker}")]
    UnsupportedAllele { marker: String, allele: char },

    /// The marker has no forward-strand allele pair in the CSV manifest
    #[error("No csv alleles available for marker {0}")]
    MissingCsvAlleles(String),
}

/// Errors related to run configuration, raised before any record is processed
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The output directory already contains `.gtc` files
    #[error("Output directory {0} already contains .gtc files; move them or choose another directory")]
    DirtyOutputDir(std::path::PathBuf),
}
