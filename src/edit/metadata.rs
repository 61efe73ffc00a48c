//! Metadata field updater
//!
//! Applies a block header's comma-separated `key=value` assignment list
//! to a record's scalar metadata fields. The recognized keys form a
//! closed set mapped to fixed field identifiers; unrecognized or
//! malformed items are reported and ignored, never fatal.

use crate::error::RecordError;
use crate::events::EventLog;
use crate::gtc::{field_id, GtcRecord};

/// The scalar metadata fields recognized in an assignment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    SampleName,
    PlateName,
    Well,
    SentrixBarcode,
    Sex,
}

impl MetadataField {
    /// Looks up a field by its script key. Keys are case-sensitive.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sampleName" => Some(Self::SampleName),
            "plateName" => Some(Self::PlateName),
            "well" => Some(Self::Well),
            "sentrixBarcode" => Some(Self::SentrixBarcode),
            "sex" => Some(Self::Sex),
            _ => None,
        }
    }

    /// The record field identifier this key writes to.
    #[must_use]
    pub fn field_id(self) -> u16 {
        match self {
            Self::SampleName => field_id::SAMPLE_NAME,
            Self::PlateName => field_id::SAMPLE_PLATE,
            Self::Well => field_id::SAMPLE_WELL,
            Self::SentrixBarcode => field_id::SENTRIX_BARCODE,
            Self::Sex => field_id::GENDER,
        }
    }
}

/// Applies an assignment list to the record's scalar metadata fields.
pub fn apply_assignments(
    record: &mut GtcRecord,
    assignments: &str,
    events: &mut EventLog,
) -> Result<(), RecordError> {
    for item in assignments.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let Some((key, value)) = item.split_once('=') else {
            events.warning(format!(
                "MetaData assignment {item:?} is not key=value; ignoring..."
            ));
            continue;
        };
        match MetadataField::from_key(key) {
            Some(field) => record.set_string(field.field_id(), value)?,
            None => {
                events.warning(format!(
                    "MetaData {key} does not exist; please make sure spelling is correct and case sensitive! Ignoring..."
                ));
            }
        }
    }
    Ok(())
}
