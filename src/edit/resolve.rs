//! Allele resolution engine
//!
//! Maps a requested allele pair to a genotype code and 2-character base
//! call given a marker's manifest definition. Classification works on the
//! marker's strand-corrected reference alleles; base-call rendering uses
//! the strand-corrected pair for indel requests and the CSV-derived
//! forward-strand pair for standard base requests (indel markers are not
//! representable in the CSV allele source).

use crate::error::EditError;
use crate::gtc::{GenotypeCode, NO_CALL_BASES};
use crate::manifest::{complement, Marker, NO_CALL_ALLELE};

/// Insertion sentinel allele symbol
const INSERTION: u8 = b'I';

/// Deletion sentinel allele symbol
const DELETION: u8 = b'D';

/// A resolved call: the genotype code and base-call string to write into
/// the record at the marker's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCall {
    pub code: GenotypeCode,
    pub bases: [u8; 2],
}

/// Resolves a requested allele pair against a marker definition.
///
/// # Errors
///
/// Returns an error when the request matches no classification branch
/// (directly or through its strand complement), when a requested symbol is
/// outside the complement table, or when a standard base request targets a
/// marker without CSV alleles. All of these abort the caller's batch.
pub fn resolve(marker: &Marker, requested: [u8; 2]) -> Result<ResolvedCall, EditError> {
    let refs = marker.resolved_alleles();
    let code = classify(marker, requested, refs)?;

    let bases = match code {
        GenotypeCode::NoCall => NO_CALL_BASES,
        _ if is_indel(requested) => call_pair(code, refs),
        _ => {
            let csv = marker
                .csv_alleles
                .ok_or_else(|| EditError::MissingCsvAlleles(marker.name.clone()))?;
            call_pair(code, csv)
        }
    };
    Ok(ResolvedCall { code, bases })
}

/// Classifies the requested pair into a genotype code.
///
/// Any two distinct symbols whose first is not the no-call sentinel are
/// heterozygous, regardless of identity to the reference alleles. A
/// homozygous pair is matched against the references directly, then
/// through its complement.
fn classify(
    marker: &Marker,
    requested: [u8; 2],
    refs: [u8; 2],
) -> Result<GenotypeCode, EditError> {
    let [r0, r1] = requested;
    if r0 != r1 && r0 != NO_CALL_ALLELE {
        return Ok(GenotypeCode::Het);
    }
    if r0 == NO_CALL_ALLELE && r1 == NO_CALL_ALLELE {
        return Ok(GenotypeCode::NoCall);
    }
    if r0 == r1 {
        if let Some(code) = homozygous_code(r0, refs) {
            return Ok(code);
        }
        let complemented = complement(r0).ok_or_else(|| EditError::UnsupportedAllele {
            marker: marker.name.clone(),
            allele: r0 as char,
        })?;
        if let Some(code) = homozygous_code(complemented, refs) {
            return Ok(code);
        }
    }
    Err(EditError::UnresolvablePair {
        marker: marker.name.clone(),
        requested: String::from_utf8_lossy(&requested).into_owned(),
    })
}

fn homozygous_code(allele: u8, [ref0, ref1]: [u8; 2]) -> Option<GenotypeCode> {
    if allele == ref0 {
        Some(GenotypeCode::HomRef)
    } else if allele == ref1 {
        Some(GenotypeCode::HomAlt)
    } else {
        None
    }
}

/// Renders the 2-character call for a non-no-call code from an allele pair.
fn call_pair(code: GenotypeCode, [a, b]: [u8; 2]) -> [u8; 2] {
    match code {
        GenotypeCode::NoCall => NO_CALL_BASES,
        GenotypeCode::HomRef => [a, a],
        GenotypeCode::Het => [a, b],
        GenotypeCode::HomAlt => [b, b],
    }
}

/// Indel requests are rendered from the strand-corrected reference pair.
fn is_indel([r0, _]: [u8; 2]) -> bool {
    r0 == INSERTION || r0 == DELETION
}
