//! Persisted shape: table names, key layouts, row encodings.
//!
//! All keys order by big-endian id, so ordered scans come back in ascending
//! id order. Secondary indexes:
//!
//! - `dataset_name_idx`:      name -> dataset id (unique)
//! - `batch_key_idx`:         batch key -> batch id (caller convention)
//! - `record_local_id_idx`:   (dataset, local_id) -> record id (unique)
//! - `record_dataset_idx`:    (dataset, record id) -> ()
//! - `record_batch_idx`:      (batch, record id) -> ()
//!
//! A row that decodes short or long is corrupt and fails loudly; no column
//! is ever silently defaulted.

use crate::codec;
use crate::error::{Error, Result};
use crate::model::{Batch, DataSet, DataSetId, Record, RecordId};
use chrono::{DateTime, Utc};
use snapsync_store::encoding::{
    put_bytes, put_i64, put_opt_i64, put_opt_string, put_string, put_u64,
};
use snapsync_store::Reader;

pub(crate) const DATASET: &str = "dataset";
pub(crate) const DATASET_NAME_IDX: &str = "dataset_name_idx";
pub(crate) const BATCH: &str = "batch";
pub(crate) const BATCH_KEY_IDX: &str = "batch_key_idx";
pub(crate) const RECORD: &str = "record";
pub(crate) const RECORD_LOCAL_ID_IDX: &str = "record_local_id_idx";
pub(crate) const RECORD_DATASET_IDX: &str = "record_dataset_idx";
pub(crate) const RECORD_BATCH_IDX: &str = "record_batch_idx";

pub(crate) const DATASET_ID_SEQ: &str = "dataset_id_seq";
pub(crate) const BATCH_ID_SEQ: &str = "batch_id_seq";
pub(crate) const RECORD_ID_SEQ: &str = "record_id_seq";

pub(crate) fn id_key(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub(crate) fn name_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

pub(crate) fn local_id_key(dataset: DataSetId, local_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + local_id.len());
    key.extend_from_slice(&dataset.to_be_bytes());
    key.extend_from_slice(local_id.as_bytes());
    key
}

pub(crate) fn member_key(owner: u64, record: RecordId) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&owner.to_be_bytes());
    key.extend_from_slice(&record.to_be_bytes());
    key
}

pub(crate) fn owner_prefix(owner: u64) -> Vec<u8> {
    owner.to_be_bytes().to_vec()
}

/// Record id from the trailing 8 bytes of a membership index key.
pub(crate) fn record_id_from_member_key(key: &[u8]) -> Result<RecordId> {
    if key.len() != 16 {
        return Err(corrupt(format!(
            "membership index key has {} bytes, expected 16",
            key.len()
        )));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&key[8..]);
    Ok(u64::from_be_bytes(buf))
}

fn corrupt(msg: String) -> Error {
    Error::Storage(snapsync_store::Error::Encoding(msg))
}

fn encode_time(buf: &mut Vec<u8>, t: &DateTime<Utc>) {
    put_i64(buf, t.timestamp_micros());
}

fn decode_time(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| corrupt(format!("timestamp out of range: {micros}")))
}

fn finish(reader: &Reader<'_>, entity: &str) -> Result<()> {
    if reader.is_exhausted() {
        Ok(())
    } else {
        Err(corrupt(format!("trailing bytes after {entity} row")))
    }
}

pub(crate) fn encode_data_set(ds: &DataSet) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u64(&mut buf, ds.id);
    put_string(&mut buf, &ds.name);
    put_opt_string(&mut buf, ds.display_name.as_deref());
    put_i64(&mut buf, ds.agency_id);
    buf
}

pub(crate) fn decode_data_set(bytes: &[u8]) -> Result<DataSet> {
    let mut r = Reader::new(bytes);
    let ds = DataSet {
        id: r.read_u64()?,
        name: r.read_string()?,
        display_name: r.read_opt_string()?,
        agency_id: r.read_i64()?,
    };
    finish(&r, "dataset")?;
    Ok(ds)
}

pub(crate) fn encode_batch(batch: &Batch) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    put_u64(&mut buf, batch.id);
    put_u64(&mut buf, batch.dataset);
    put_u64(&mut buf, batch.batch_key);
    let type_cell = codec::encode_batch_type(Some(&batch.batch_type));
    put_opt_string(&mut buf, type_cell.value.as_deref());
    encode_time(&mut buf, &batch.time_of_creation);
    put_opt_i64(
        &mut buf,
        batch.time_of_completion.as_ref().map(|t| t.timestamp_micros()),
    );
    let metadata = match &batch.metadata {
        Some(value) => Some(
            serde_json::to_string(value)
                .map_err(|e| corrupt(format!("batch metadata: {e}")))?,
        ),
        None => None,
    };
    put_opt_string(&mut buf, metadata.as_deref());
    Ok(buf)
}

pub(crate) fn decode_batch(bytes: &[u8]) -> Result<Batch> {
    let mut r = Reader::new(bytes);
    let id = r.read_u64()?;
    let dataset = r.read_u64()?;
    let batch_key = r.read_u64()?;
    let type_value = r.read_opt_string()?;
    let batch_type = codec::decode_batch_type(type_value.as_deref())?;
    let time_of_creation = decode_time(r.read_i64()?)?;
    let time_of_completion = match r.read_opt_i64()? {
        Some(micros) => Some(decode_time(micros)?),
        None => None,
    };
    let metadata = match r.read_opt_string()? {
        Some(json) => Some(
            serde_json::from_str(&json)
                .map_err(|e| corrupt(format!("batch metadata: {e}")))?,
        ),
        None => None,
    };
    finish(&r, "batch")?;
    Ok(Batch {
        id,
        dataset,
        batch_key,
        batch_type,
        time_of_creation,
        time_of_completion,
        metadata,
    })
}

pub(crate) fn encode_record(record: &Record) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u64(&mut buf, record.id);
    put_u64(&mut buf, record.batch);
    put_u64(&mut buf, record.dataset);
    put_string(&mut buf, &record.local_id);
    put_string(&mut buf, &record.tracking_id);
    let status_cell = codec::encode_record_status(Some(&record.status));
    put_opt_string(&mut buf, status_cell.value.as_deref());
    encode_time(&mut buf, &record.time_of_creation);
    encode_time(&mut buf, &record.time_of_last_modification);
    put_bytes(&mut buf, &record.content);
    put_string(&mut buf, &record.checksum);
    buf
}

pub(crate) fn decode_record(bytes: &[u8]) -> Result<Record> {
    let mut r = Reader::new(bytes);
    let id = r.read_u64()?;
    let batch = r.read_u64()?;
    let dataset = r.read_u64()?;
    let local_id = r.read_string()?;
    let tracking_id = r.read_string()?;
    let status_value = r.read_opt_string()?;
    let status = codec::decode_record_status(status_value.as_deref())?;
    let time_of_creation = decode_time(r.read_i64()?)?;
    let time_of_last_modification = decode_time(r.read_i64()?)?;
    let content = r.read_bytes()?.to_vec();
    let checksum = r.read_string()?;
    finish(&r, "record")?;
    Ok(Record {
        id,
        batch,
        dataset,
        local_id,
        tracking_id,
        status,
        time_of_creation,
        time_of_last_modification,
        content,
        checksum,
    })
}
