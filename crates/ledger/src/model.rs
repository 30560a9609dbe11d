//! Entity model: datasets, batches, records.

use crate::codec::{BatchType, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type DataSetId = u64;
pub type BatchId = u64;
pub type RecordId = u64;

/// A named dataset. Created once per logical dataset, rarely mutated and
/// never deleted by this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    /// Store-assigned, immutable.
    pub id: DataSetId,
    /// Unique dataset name.
    pub name: String,
    /// Optional human-readable label.
    pub display_name: Option<String>,
    /// Owning submitter identifier.
    pub agency_id: i64,
}

/// Values for creating a [`DataSet`]; id is store-assigned.
#[derive(Debug, Clone)]
pub struct NewDataSet {
    pub name: String,
    pub display_name: Option<String>,
    pub agency_id: i64,
}

/// One ingestion pass over a dataset.
///
/// A batch is open while `time_of_completion` is `None` and closed once it
/// is set, whether it completed normally or via abort. There is no
/// transition back to open, and `batch_type` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    pub dataset: DataSetId,
    /// Caller-supplied external correlation key; uniqueness is caller
    /// convention, not enforced here.
    pub batch_key: u64,
    pub batch_type: BatchType,
    pub time_of_creation: DateTime<Utc>,
    pub time_of_completion: Option<DateTime<Utc>>,
    /// Opaque caller-defined blob, passed through unmodified.
    pub metadata: Option<serde_json::Value>,
}

impl Batch {
    pub fn is_open(&self) -> bool {
        self.time_of_completion.is_none()
    }
}

/// Values for creating a [`Batch`]; id and creation time are store-assigned.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub dataset: DataSetId,
    pub batch_key: u64,
    pub batch_type: BatchType,
    pub metadata: Option<serde_json::Value>,
}

/// A tracked record.
///
/// `batch` is the last batch that wrote or touched this record, not an
/// ownership list: the pointer moves across batches over the record's
/// lifetime. `(dataset, local_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub batch: BatchId,
    pub dataset: DataSetId,
    /// Caller-supplied external key, unique per dataset.
    pub local_id: String,
    /// Caller-supplied correlation string.
    pub tracking_id: String,
    pub status: RecordStatus,
    pub time_of_creation: DateTime<Utc>,
    /// Stamped by the store layer on every insert and update, never by the
    /// caller.
    pub time_of_last_modification: DateTime<Utc>,
    /// Opaque payload.
    pub content: Vec<u8>,
    /// Caller-supplied digest of `content`, used to detect no-op updates.
    pub checksum: String,
}

/// Values for creating a [`Record`]; id and timestamps are store-assigned.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub dataset: DataSetId,
    pub batch: BatchId,
    pub local_id: String,
    pub tracking_id: String,
    pub status: RecordStatus,
    pub content: Vec<u8>,
    pub checksum: String,
}

/// Lookup selector for datasets.
#[derive(Debug, Clone)]
pub enum DataSetLookup<'a> {
    Id(DataSetId),
    Name(&'a str),
}

/// Lookup selector for batches.
#[derive(Debug, Clone)]
pub enum BatchLookup {
    Id(BatchId),
    Key(u64),
}

/// Lookup selector for records.
#[derive(Debug, Clone)]
pub enum RecordLookup<'a> {
    Id(RecordId),
    LocalId {
        dataset: DataSetId,
        local_id: &'a str,
    },
}

/// Aggregate view of one dataset, for operational callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetSummary {
    pub name: String,
    pub total: u64,
    pub active: u64,
    pub deleted: u64,
    pub reset: u64,
    pub time_of_last_modification: Option<DateTime<Utc>>,
    /// Highest batch id referenced by any record in the dataset.
    pub batch_id: BatchId,
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataSet{{id={}, name='{}', agency_id={}}}",
            self.id, self.name, self.agency_id
        )
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch{{id={}, dataset={}, batch_key={}, type={:?}, created={}, completed={:?}}}",
            self.id,
            self.dataset,
            self.batch_key,
            self.batch_type,
            self.time_of_creation,
            self.time_of_completion
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record{{id={}, batch={}, dataset={}, local_id='{}', status={:?}}}",
            self.id, self.batch, self.dataset, self.local_id, self.status
        )
    }
}
