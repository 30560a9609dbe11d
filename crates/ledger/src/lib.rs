//! Dataset ingest tracking with mark-sweep reconciliation.
//!
//! This crate is the system of record for "what is currently present in
//! dataset D, and what changed in the last ingestion pass". Records enter
//! named datasets through discrete batches; a TOTAL batch represents a full
//! resynchronization and drives the three-state mark-sweep protocol:
//!
//! - **mark**: creating a TOTAL batch flips every ACTIVE record in the
//!   dataset to RESET ("assumed gone until reconfirmed")
//! - the ingestion pipeline re-touches the records it still sees, restoring
//!   them to ACTIVE and moving their batch pointer when content changed
//! - **sweep**: closing the batch flips every record still RESET to DELETED
//!
//! Aborting a TOTAL batch instead undoes the remaining marks, leaving the
//! dataset exactly as it was, while the batch itself still completes and
//! stays in history.
//!
//! Consumers poll [`Ledger::get_next_batch`] for completed batches and drain
//! their records through the bounded-memory [`RecordCursor`].

mod codec;
mod cursor;
mod error;
mod estimate;
mod ledger;
mod model;
mod schema;

pub use codec::{BatchType, RecordStatus, StoredEnum, decode_batch_type, decode_record_status,
    encode_batch_type, encode_record_status};
pub use cursor::{Cursor, RecordCursor, PAGE_SIZE};
pub use error::{Error, Result};
pub use estimate::{ApproximateCount, PlanRowEstimate, APPROXIMATE_COUNT_THRESHOLD};
pub use ledger::Ledger;
pub use model::{
    Batch, BatchId, BatchLookup, DataSet, DataSetId, DataSetLookup, DataSetSummary, NewBatch,
    NewDataSet, NewRecord, Record, RecordId, RecordLookup,
};

pub use snapsync_store::{StoreConfig, Table, Transaction};
