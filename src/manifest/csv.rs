//! Auxiliary CSV manifest reader
//!
//! The manifest-in-CSV form supplies a forward-strand allele pair per
//! marker, used for base-call rendering of non-indel markers. The file
//! opens with a 7-line descriptive preamble, then a header row; the
//! allele pair is embedded in the `TopGenomicSeq` column as a `[x/y]`
//! bracket group. Rows without a bracket group (indel markers) yield no
//! pair.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{ManifestError, Result};

/// Number of descriptive lines preceding the header row.
const PREAMBLE_LINES: usize = 7;

/// One marker row from the CSV manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvEntry {
    pub name: String,
    /// Forward-strand allele pair; `None` when the row has no bracket group
    pub alleles: Option<[u8; 2]>,
}

/// The decoded CSV manifest: marker rows in design order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvManifest {
    pub entries: Vec<CsvEntry>,
}

impl CsvManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = File::open(path).map(BufReader::new)?;
        Self::from_reader(reader)
    }

    /// Decodes the CSV manifest from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the preamble is shorter than expected, the
    /// header row lacks the `Name` or `TopGenomicSeq` column, or the CSV
    /// body is malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        for _ in 0..PREAMBLE_LINES {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(ManifestError::MissingColumn("Name").into());
            }
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(ManifestError::CsvError)?;
        let name_idx = position(headers, "Name")?;
        let seq_idx = position(headers, "TopGenomicSeq")?;

        let mut entries = Vec::new();
        for row in csv_reader.records() {
            let row = row.map_err(ManifestError::CsvError)?;
            let name = row.get(name_idx).unwrap_or_default().to_string();
            let alleles = row.get(seq_idx).and_then(bracket_alleles);
            entries.push(CsvEntry { name, alleles });
        }
        Ok(Self { entries })
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

fn position(headers: &csv::StringRecord, column: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ManifestError::MissingColumn(column).into())
}

/// Extracts the first `[x/y]` bracket group from a top genomic sequence.
///
/// The group may appear at any offset; only its two allele characters are
/// kept. Sequences without a group (indel rows) yield `None`.
fn bracket_alleles(seq: &str) -> Option<[u8; 2]> {
    let bytes = seq.as_bytes();
    for i in 0..bytes.len().saturating_sub(4) {
        if bytes[i] == b'[' && bytes[i + 4] == b']' {
            return Some([bytes[i + 1], bytes[i + 3]]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const CSV_TEXT: &str = "\
Illumina Inc.
Assay Format,Infinium
Date Manufactured,4/7/2020
Loci Count,3
Descriptor File Name,test.bpm
Content,test
GenomeBuild,37
IlmnID,Name,TopGenomicSeq,RefStrand
rs100_ilmn,rs100,ACGTA[A/G]TTACG,+
rs200_ilmn,rs200,GGGTTACCA,-
rs300_ilmn,rs300,[T/C]AAAA,+
";

    #[test]
    fn parses_rows_after_preamble() -> Result<()> {
        let manifest = CsvManifest::from_reader(CSV_TEXT.as_bytes())?;
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.entries[0].name, "rs100");
        assert_eq!(manifest.entries[0].alleles, Some([b'A', b'G']));
        assert_eq!(manifest.entries[1].alleles, None);
        assert_eq!(manifest.entries[2].alleles, Some([b'T', b'C']));
        Ok(())
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = CSV_TEXT.replace("TopGenomicSeq", "GenomicSeq");
        assert!(matches!(
            CsvManifest::from_reader(text.as_bytes()),
            Err(crate::Error::ManifestError(ManifestError::MissingColumn(
                "TopGenomicSeq"
            )))
        ));
    }

    #[test]
    fn bracket_group_at_start_of_sequence() {
        assert_eq!(bracket_alleles("[A/T]CCC"), Some([b'A', b'T']));
        assert_eq!(bracket_alleles("CCC"), None);
        assert_eq!(bracket_alleles(""), None);
    }
}
