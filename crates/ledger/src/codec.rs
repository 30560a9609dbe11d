//! Codec between the closed enum sets and their stored string form.
//!
//! The stored cell is a typed pair of enum-type name and optional string
//! value, portable across storage engines. The two directions are
//! deliberately asymmetric:
//!
//! - encoding never fails: an absent enum still produces a well-formed cell
//!   carrying an explicit null payload
//! - decoding a null payload fails with a validation error, while an
//!   unrecognized non-null string comes back as the `Unrecognized` sentinel
//!   rather than an error, so stored values written by newer code survive a
//!   round trip through older code. Callers must handle the sentinel
//!   defensively.

use crate::error::{Error, Result};

/// Batch type: a TOTAL batch is a full resynchronization and drives
/// mark-sweep; an INCREMENTAL batch is a delta update and never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchType {
    Total,
    Incremental,
    /// Stored value unknown to this code; preserved verbatim.
    Unrecognized(String),
}

impl BatchType {
    pub fn is_total(&self) -> bool {
        matches!(self, BatchType::Total)
    }

    fn stored_value(&self) -> &str {
        match self {
            BatchType::Total => "TOTAL",
            BatchType::Incremental => "INCREMENTAL",
            BatchType::Unrecognized(raw) => raw,
        }
    }
}

/// Record status. ACTIVE is the steady state; RESET is the transient
/// mark applied while a TOTAL resync is in flight; DELETED is terminal until
/// an ingestion explicitly re-touches the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    Deleted,
    Reset,
    /// Stored value unknown to this code; preserved verbatim.
    Unrecognized(String),
}

impl RecordStatus {
    fn stored_value(&self) -> &str {
        match self {
            RecordStatus::Active => "ACTIVE",
            RecordStatus::Deleted => "DELETED",
            RecordStatus::Reset => "RESET",
            RecordStatus::Unrecognized(raw) => raw,
        }
    }
}

/// A typed enum cell as it goes to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEnum {
    /// Name of the enum type the cell belongs to.
    pub type_name: &'static str,
    /// Stored string, or an explicit null payload.
    pub value: Option<String>,
}

pub const BATCH_TYPE: &str = "batch_type";
pub const RECORD_STATUS: &str = "record_status";

pub fn encode_batch_type(batch_type: Option<&BatchType>) -> StoredEnum {
    StoredEnum {
        type_name: BATCH_TYPE,
        value: batch_type.map(|t| t.stored_value().to_string()),
    }
}

pub fn decode_batch_type(value: Option<&str>) -> Result<BatchType> {
    match value {
        None => Err(Error::Validation("batch type value required".to_string())),
        Some("TOTAL") => Ok(BatchType::Total),
        Some("INCREMENTAL") => Ok(BatchType::Incremental),
        Some(other) => Ok(BatchType::Unrecognized(other.to_string())),
    }
}

pub fn encode_record_status(status: Option<&RecordStatus>) -> StoredEnum {
    StoredEnum {
        type_name: RECORD_STATUS,
        value: status.map(|s| s.stored_value().to_string()),
    }
}

pub fn decode_record_status(value: Option<&str>) -> Result<RecordStatus> {
    match value {
        None => Err(Error::Validation("record status value required".to_string())),
        Some("ACTIVE") => Ok(RecordStatus::Active),
        Some("DELETED") => Ok(RecordStatus::Deleted),
        Some("RESET") => Ok(RecordStatus::Reset),
        Some(other) => Ok(RecordStatus::Unrecognized(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_absent_batch_type_yields_null_payload() {
        let cell = encode_batch_type(None);
        assert_eq!(cell.type_name, "batch_type");
        assert_eq!(cell.value, None);
    }

    #[test]
    fn encode_batch_type_yields_stored_name() {
        let cell = encode_batch_type(Some(&BatchType::Total));
        assert_eq!(cell.type_name, "batch_type");
        assert_eq!(cell.value.as_deref(), Some("TOTAL"));
    }

    #[test]
    fn decode_batch_type_null_is_an_error() {
        assert!(decode_batch_type(None).is_err());
    }

    #[test]
    fn decode_known_and_unknown_batch_types() {
        assert_eq!(decode_batch_type(Some("TOTAL")).unwrap(), BatchType::Total);
        assert_eq!(
            decode_batch_type(Some("INCREMENTAL")).unwrap(),
            BatchType::Incremental
        );
        assert_eq!(
            decode_batch_type(Some("UNKNOWN")).unwrap(),
            BatchType::Unrecognized("UNKNOWN".to_string())
        );
    }

    #[test]
    fn encode_absent_status_yields_null_payload() {
        let cell = encode_record_status(None);
        assert_eq!(cell.type_name, "record_status");
        assert_eq!(cell.value, None);
    }

    #[test]
    fn decode_status_null_is_an_error() {
        assert!(decode_record_status(None).is_err());
    }

    #[test]
    fn decode_known_and_unknown_statuses() {
        assert_eq!(
            decode_record_status(Some("ACTIVE")).unwrap(),
            RecordStatus::Active
        );
        assert_eq!(
            decode_record_status(Some("DELETED")).unwrap(),
            RecordStatus::Deleted
        );
        assert_eq!(
            decode_record_status(Some("RESET")).unwrap(),
            RecordStatus::Reset
        );
        assert_eq!(
            decode_record_status(Some("UNKNOWN")).unwrap(),
            RecordStatus::Unrecognized("UNKNOWN".to_string())
        );
    }

    #[test]
    fn sentinel_survives_a_round_trip() {
        let status = decode_record_status(Some("ARCHIVED")).unwrap();
        let cell = encode_record_status(Some(&status));
        assert_eq!(cell.value.as_deref(), Some("ARCHIVED"));
    }
}
