use std::collections::BTreeMap;

use crate::error::RecordError;
use crate::gtc::{field_id, field_kind, FieldKind};

/// The 2-character base-call string of a no-call.
pub const NO_CALL_BASES: [u8; 2] = *b"--";

/// Integer classification of a call at a marker.
///
/// The numeric values are wire-visible in the record format and shared
/// with downstream consumers; they must be reproduced exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GenotypeCode {
    NoCall = 0,
    HomRef = 1,
    Het = 2,
    HomAlt = 3,
}

impl GenotypeCode {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoCall),
            1 => Some(Self::HomRef),
            2 => Some(Self::Het),
            3 => Some(Self::HomAlt),
            _ => None,
        }
    }
}

/// A typed field payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    U32(u32),
    F32(f32),
    U8Array(Vec<u8>),
    U16Array(Vec<u16>),
    U16Triple([u16; 3]),
    F32Array(Vec<f32>),
    CallArray(Vec<[u8; 2]>),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Str(_) => FieldKind::Str,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
            Self::U8Array(_) => FieldKind::U8Array,
            Self::U16Array(_) => FieldKind::U16Array,
            Self::U16Triple(_) => FieldKind::U16Triple,
            Self::F32Array(_) => FieldKind::F32Array,
            Self::CallArray(_) => FieldKind::CallArray,
        }
    }
}

/// A decoded per-sample GTC record: typed field payloads keyed by the
/// integer field identifier.
///
/// Fields are kept in identifier order so that encoding is deterministic
/// and untouched fields round-trip byte-identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GtcRecord {
    fields: BTreeMap<u16, FieldValue>,
}

impl GtcRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u16, value: FieldValue) {
        self.fields.insert(id, value);
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&FieldValue> {
        self.fields.get(&id)
    }

    /// All fields in identifier order.
    pub fn fields(&self) -> impl Iterator<Item = (u16, &FieldValue)> {
        self.fields.iter().map(|(&id, value)| (id, value))
    }

    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    fn required(&self, id: u16) -> Result<&FieldValue, RecordError> {
        self.fields.get(&id).ok_or(RecordError::MissingField(id))
    }

    fn str_field(&self, id: u16) -> Result<&str, RecordError> {
        match self.required(id)? {
            FieldValue::Str(s) => Ok(s),
            _ => Err(RecordError::FieldKindMismatch {
                id,
                expected: FieldKind::Str.name(),
            }),
        }
    }

    fn u16_array(&self, id: u16) -> Result<&[u16], RecordError> {
        match self.required(id)? {
            FieldValue::U16Array(v) => Ok(v),
            _ => Err(RecordError::FieldKindMismatch {
                id,
                expected: FieldKind::U16Array.name(),
            }),
        }
    }

    fn f32_array(&self, id: u16) -> Result<&[f32], RecordError> {
        match self.required(id)? {
            FieldValue::F32Array(v) => Ok(v),
            _ => Err(RecordError::FieldKindMismatch {
                id,
                expected: FieldKind::F32Array.name(),
            }),
        }
    }

    // --- scalar metadata ---

    pub fn sample_name(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::SAMPLE_NAME)
    }

    pub fn sample_plate(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::SAMPLE_PLATE)
    }

    pub fn sample_well(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::SAMPLE_WELL)
    }

    pub fn cluster_file(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::CLUSTER_FILE)
    }

    pub fn autocall_date(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::AUTOCALL_DATE)
    }

    pub fn autocall_version(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::AUTOCALL_VERSION)
    }

    pub fn gender(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::GENDER)
    }

    pub fn sentrix_barcode(&self) -> Result<&str, RecordError> {
        self.str_field(field_id::SENTRIX_BARCODE)
    }

    // --- per-marker and control arrays ---

    pub fn controls_x(&self) -> Result<&[u16], RecordError> {
        self.u16_array(field_id::CONTROLS_X)
    }

    pub fn controls_y(&self) -> Result<&[u16], RecordError> {
        self.u16_array(field_id::CONTROLS_Y)
    }

    pub fn raw_x(&self) -> Result<&[u16], RecordError> {
        self.u16_array(field_id::RAW_X)
    }

    pub fn raw_y(&self) -> Result<&[u16], RecordError> {
        self.u16_array(field_id::RAW_Y)
    }

    pub fn genotypes(&self) -> Result<&[u8], RecordError> {
        match self.required(field_id::GENOTYPES)? {
            FieldValue::U8Array(v) => Ok(v),
            _ => Err(RecordError::FieldKindMismatch {
                id: field_id::GENOTYPES,
                expected: FieldKind::U8Array.name(),
            }),
        }
    }

    pub fn base_calls(&self) -> Result<&[[u8; 2]], RecordError> {
        match self.required(field_id::BASE_CALLS)? {
            FieldValue::CallArray(v) => Ok(v),
            _ => Err(RecordError::FieldKindMismatch {
                id: field_id::BASE_CALLS,
                expected: FieldKind::CallArray.name(),
            }),
        }
    }

    pub fn genotype_scores(&self) -> Result<&[f32], RecordError> {
        self.f32_array(field_id::GENOTYPE_SCORES)
    }

    pub fn b_allele_freqs(&self) -> Result<&[f32], RecordError> {
        self.f32_array(field_id::B_ALLELE_FREQS)
    }

    pub fn logr_ratios(&self) -> Result<&[f32], RecordError> {
        self.f32_array(field_id::LOGR_RATIOS)
    }

    pub fn percentiles_x(&self) -> Result<[u16; 3], RecordError> {
        match self.required(field_id::PERCENTILES_X)? {
            FieldValue::U16Triple(v) => Ok(*v),
            _ => Err(RecordError::FieldKindMismatch {
                id: field_id::PERCENTILES_X,
                expected: FieldKind::U16Triple.name(),
            }),
        }
    }

    /// Number of no-calls, computed from the genotype array.
    pub fn num_no_calls(&self) -> Result<usize, RecordError> {
        Ok(self
            .genotypes()?
            .iter()
            .filter(|&&code| code == GenotypeCode::NoCall as u8)
            .count())
    }

    // --- mutation ---

    /// Replaces a scalar string field.
    ///
    /// The identifier must name a string field in the registry.
    pub fn set_string(&mut self, id: u16, value: impl Into<String>) -> Result<(), RecordError> {
        match field_kind(id) {
            Some(FieldKind::Str) => {
                self.fields.insert(id, FieldValue::Str(value.into()));
                Ok(())
            }
            Some(_) => Err(RecordError::FieldKindMismatch {
                id,
                expected: FieldKind::Str.name(),
            }),
            None => Err(RecordError::UnknownFieldId(id)),
        }
    }

    /// Writes the genotype code and base-call string at one marker index.
    ///
    /// Both arrays are updated together so the joint-consistency invariant
    /// holds at every point: code 0 pairs with `--`, codes 1/2/3 pair with
    /// the two-letter call implied by the marker's resolved alleles.
    pub fn set_call(
        &mut self,
        index: usize,
        code: GenotypeCode,
        bases: [u8; 2],
    ) -> Result<(), RecordError> {
        {
            let genotypes = match self.fields.get_mut(&field_id::GENOTYPES) {
                Some(FieldValue::U8Array(v)) => v,
                Some(_) => {
                    return Err(RecordError::FieldKindMismatch {
                        id: field_id::GENOTYPES,
                        expected: FieldKind::U8Array.name(),
                    })
                }
                None => return Err(RecordError::MissingField(field_id::GENOTYPES)),
            };
            let len = genotypes.len();
            *genotypes
                .get_mut(index)
                .ok_or(RecordError::OutOfRange { index, len })? = code as u8;
        }
        let calls = match self.fields.get_mut(&field_id::BASE_CALLS) {
            Some(FieldValue::CallArray(v)) => v,
            Some(_) => {
                return Err(RecordError::FieldKindMismatch {
                    id: field_id::BASE_CALLS,
                    expected: FieldKind::CallArray.name(),
                })
            }
            None => return Err(RecordError::MissingField(field_id::BASE_CALLS)),
        };
        let len = calls.len();
        *calls
            .get_mut(index)
            .ok_or(RecordError::OutOfRange { index, len })? = bases;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GtcRecord {
        let mut record = GtcRecord::new();
        record.insert(field_id::SAMPLE_NAME, FieldValue::Str("NA12878".to_string()));
        record.insert(
            field_id::GENOTYPES,
            FieldValue::U8Array(vec![1, 0, 2, 3]),
        );
        record.insert(
            field_id::BASE_CALLS,
            FieldValue::CallArray(vec![*b"AA", *b"--", *b"AG", *b"GG"]),
        );
        record
    }

    #[test]
    fn typed_accessors() {
        let record = sample();
        assert_eq!(record.sample_name().unwrap(), "NA12878");
        assert_eq!(record.genotypes().unwrap(), &[1, 0, 2, 3]);
        assert_eq!(record.num_no_calls().unwrap(), 1);
    }

    #[test]
    fn missing_field_is_typed() {
        let record = GtcRecord::new();
        assert!(matches!(
            record.sample_name(),
            Err(RecordError::MissingField(10))
        ));
    }

    #[test]
    fn set_call_updates_both_arrays() {
        let mut record = sample();
        record
            .set_call(1, GenotypeCode::HomRef, *b"AA")
            .unwrap();
        assert_eq!(record.genotypes().unwrap()[1], 1);
        assert_eq!(record.base_calls().unwrap()[1], *b"AA");
        assert_eq!(record.num_no_calls().unwrap(), 0);
    }

    #[test]
    fn set_call_bounds_checked() {
        let mut record = sample();
        assert!(matches!(
            record.set_call(10, GenotypeCode::Het, *b"AG"),
            Err(RecordError::OutOfRange { index: 10, len: 4 })
        ));
    }

    #[test]
    fn set_string_rejects_non_string_fields() {
        let mut record = sample();
        assert!(record.set_string(field_id::SAMPLE_PLATE, "plate7").is_ok());
        assert!(record.set_string(field_id::GENOTYPES, "oops").is_err());
        assert!(record.set_string(9999, "oops").is_err());
    }
}
