//! Output record validation
//!
//! Compares a freshly decoded output record against its freshly decoded
//! source and itemizes every divergence in a field expected to be
//! invariant under a genotype/metadata edit. The genotype and base-call
//! arrays are deliberately excluded - they are expected to change.
//!
//! Validation is advisory: the result is a report, never an error, and a
//! failing report does not stop the run.

use std::fmt;

use crate::gtc::GtcRecord;

/// A single invariant-field divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Name of the diverging field
    pub field: &'static str,
    /// What diverged
    pub detail: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// The itemized result of validating one output record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    mismatches: Vec<Mismatch>,
}

impl ValidationReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    #[must_use]
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    fn push(&mut self, field: &'static str, detail: impl Into<String>) {
        self.mismatches.push(Mismatch {
            field,
            detail: detail.into(),
        });
    }

    fn check_eq<T: PartialEq + fmt::Debug>(
        &mut self,
        field: &'static str,
        original: Result<T, crate::error::RecordError>,
        rewritten: Result<T, crate::error::RecordError>,
    ) {
        match (original, rewritten) {
            (Ok(a), Ok(b)) => {
                if a != b {
                    self.push(field, format!("source {a:?} != output {b:?}"));
                }
            }
            (Err(err), _) | (_, Err(err)) => self.push(field, format!("unreadable: {err}")),
        }
    }

    fn check_elementwise<T: PartialEq + fmt::Debug>(
        &mut self,
        field: &'static str,
        original: Result<&[T], crate::error::RecordError>,
        rewritten: Result<&[T], crate::error::RecordError>,
    ) {
        match (original, rewritten) {
            (Ok(a), Ok(b)) => {
                if a.len() != b.len() {
                    self.push(field, format!("length {} != {}", a.len(), b.len()));
                } else if let Some(pos) = (0..a.len()).find(|&i| a[i] != b[i]) {
                    self.push(
                        field,
                        format!(
                            "first divergence at index {pos}: {:?} != {:?}",
                            a[pos], b[pos]
                        ),
                    );
                }
            }
            (Err(err), _) | (_, Err(err)) => self.push(field, format!("unreadable: {err}")),
        }
    }

    fn check_len<T>(
        &mut self,
        field: &'static str,
        array: Result<&[T], crate::error::RecordError>,
        expected: usize,
    ) {
        match array {
            Ok(v) => {
                if v.len() != expected {
                    self.push(
                        field,
                        format!("length {} != marker count {expected}", v.len()),
                    );
                }
            }
            Err(err) => self.push(field, format!("unreadable: {err}")),
        }
    }
}

/// Validates an output record against its source.
///
/// `marker_count` is the manifest's marker count; every per-marker array
/// of the output must have exactly that length.
#[must_use]
pub fn validate(
    original: &GtcRecord,
    rewritten: &GtcRecord,
    marker_count: usize,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check_eq(
        "autocall date",
        original.autocall_date(),
        rewritten.autocall_date(),
    );
    report.check_eq(
        "autocall version",
        original.autocall_version(),
        rewritten.autocall_version(),
    );
    report.check_eq(
        "cluster file",
        original.cluster_file(),
        rewritten.cluster_file(),
    );
    report.check_elementwise(
        "control x intensities",
        original.controls_x(),
        rewritten.controls_x(),
    );
    report.check_elementwise(
        "control y intensities",
        original.controls_y(),
        rewritten.controls_y(),
    );
    report.check_eq(
        "no-call count",
        original.num_no_calls(),
        rewritten.num_no_calls(),
    );
    report.check_elementwise(
        "genotype scores",
        original.genotype_scores(),
        rewritten.genotype_scores(),
    );
    report.check_eq(
        "x intensity percentiles",
        original.percentiles_x(),
        rewritten.percentiles_x(),
    );
    report.check_elementwise("raw x intensities", original.raw_x(), rewritten.raw_x());

    report.check_len("genotypes", rewritten.genotypes(), marker_count);
    report.check_len("log r ratios", rewritten.logr_ratios(), marker_count);
    report.check_len(
        "b allele frequencies",
        rewritten.b_allele_freqs(),
        marker_count,
    );

    report
}
