//! Manifest allele overrides
//!
//! An override file temporarily replaces the allele definition of named
//! markers for the duration of a run. The file is tab-separated, one
//! marker per line: `markerName<TAB>replacementSnpString`. Overrides are
//! applied while the marker model is constructed and are never persisted
//! back to the manifest source.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::Result;
use crate::events::EventLog;

/// A parsed override file: replacement snp strings keyed by marker name.
///
/// Replacement strings are kept verbatim at parse time; they are validated
/// when applied so that a bad line is reported against its marker and
/// skipped without affecting the rest of the set.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    entries: Vec<(String, String)>,
}

impl OverrideSet {
    pub fn from_path<P: AsRef<Path>>(path: P, events: &mut EventLog) -> Result<Self> {
        let reader = File::open(path).map(BufReader::new)?;
        Self::from_reader(reader, events)
    }

    /// Parses the tab-separated override file.
    ///
    /// Lines without a tab separator are reported and skipped; a malformed
    /// line never aborts the run.
    pub fn from_reader<R: Read>(reader: R, events: &mut EventLog) -> Result<Self> {
        let mut entries = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((name, replacement)) => {
                    entries.push((name.trim().to_string(), replacement.trim().to_string()));
                }
                None => {
                    events.error(format!(
                        "Error! Override line {line:?} is not tab-separated; please check your input override file format."
                    ));
                }
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
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
