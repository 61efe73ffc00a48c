//! # manifest
//!
//! The marker model for a run: every genotyped position of the assay in
//! design order, with its forward-strand allele definition, strand
//! orientation, and the forward-strand allele pair from the auxiliary CSV
//! manifest.
//!
//! A [`Manifest`] is built once at run start by pairing the binary
//! manifest ([`BpmManifest`]) with the CSV manifest ([`CsvManifest`]); the
//! two must list the same marker names in the same order. An optional
//! [`OverrideSet`] is applied while the model is constructed, producing a
//! new model with replaced allele definitions; after that the manifest is
//! immutable for the remainder of the run.

mod bpm;
mod csv;
mod marker;
mod overrides;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ManifestError, Result};
use crate::events::EventLog;

pub use bpm::{BpmEntry, BpmManifest};
pub use self::csv::{CsvEntry, CsvManifest};
pub use marker::{complement, Marker, RefStrand, SnpString, NO_CALL_ALLELE};
pub use overrides::OverrideSet;

/// The immutable marker model of a run.
#[derive(Debug, Clone)]
pub struct Manifest {
    markers: Vec<Marker>,
    index: HashMap<String, usize>,
}

impl Manifest {
    /// Builds a manifest directly from marker definitions.
    #[must_use]
    pub fn new(markers: Vec<Marker>) -> Self {
        let mut index = HashMap::with_capacity(markers.len());
        for (pos, marker) in markers.iter().enumerate() {
            index.entry(marker.name.clone()).or_insert(pos);
        }
        Self { markers, index }
    }

    /// Loads and pairs the binary and CSV manifests from file paths.
    pub fn from_paths<P: AsRef<Path>>(bpm_path: P, csv_path: P) -> Result<Self> {
        let bpm = BpmManifest::from_path(bpm_path)?;
        let csv = CsvManifest::from_path(csv_path)?;
        Self::from_parts(bpm, csv)
    }

    /// Pairs the two manifest sources into a single model.
    ///
    /// # Errors
    ///
    /// Returns an error when the sources have different marker counts or
    /// disagree on a marker name at any index. Both are fatal
    /// configuration errors: the run must not start.
    pub fn from_parts(bpm: BpmManifest, csv: CsvManifest) -> Result<Self> {
        if bpm.len() != csv.len() {
            return Err(ManifestError::LengthMismatch {
                bpm: bpm.len(),
                csv: csv.len(),
            }
            .into());
        }
        let markers = bpm
            .entries
            .into_iter()
            .zip(csv.entries)
            .enumerate()
            .map(|(pos, (entry, row))| {
                if entry.name != row.name {
                    return Err(ManifestError::NameMismatch {
                        index: pos,
                        bpm: entry.name,
                        csv: row.name,
                    });
                }
                Ok(Marker {
                    name: entry.name,
                    snp_string: entry.snp_string,
                    ref_strand: entry.ref_strand,
                    csv_alleles: row.alleles,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(markers))
    }

    /// Applies an override set, producing a new model for the run.
    ///
    /// Each override replaces the named marker's snp string; the
    /// before/after values are reported. An unknown marker name or a
    /// malformed replacement string is reported against its line and
    /// skipped - a bad override never aborts the run.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &OverrideSet, events: &mut EventLog) -> Self {
        for (name, replacement) in overrides.entries() {
            let Some(&pos) = self.index.get(name) else {
                events.error(format!(
                    "Error! snp {name} cannot be updated! Please check your input override file format."
                ));
                continue;
            };
            match SnpString::parse(replacement) {
                Ok(snp_string) => {
                    events.info(format!(
                        "snp {name} is being changed from {} to {snp_string}",
                        self.markers[pos].snp_string
                    ));
                    self.markers[pos].snp_string = snp_string;
                    events.info(format!("Success! Alleles of snp {name} have been updated!"));
                }
                Err(err) => {
                    events.error(format!("Error! snp {name} cannot be updated! {err}"));
                }
            }
        }
        self
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&Marker> {
        self.markers.get(pos)
    }

    /// Looks up a marker by name, returning its design index and definition.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(usize, &Marker)> {
        let &pos = self.index.get(name)?;
        Some((pos, &self.markers[pos]))
    }
}
