//! The batch/record lifecycle engine.
//!
//! Mark, sweep, and undo-mark each run as one bulk update inside the
//! enclosing transaction: either the whole phase commits with the batch
//! operation or none of it does. There is no internal retry; callers decide
//! whether to re-run the whole batch operation on failure.
//!
//! Concurrency is delegated to the store's transaction layer. What is NOT
//! defended against, by design: two TOTAL-batch lifecycles running
//! concurrently for the same dataset can interleave their mark/sweep
//! windows. Callers must keep at most one open TOTAL lifecycle per dataset,
//! e.g. through single-writer discipline or an external advisory lock.

use crate::codec::RecordStatus;
use crate::cursor::{Cursor, RecordCursor};
use crate::error::{Error, Result};
use crate::estimate::{APPROXIMATE_COUNT_THRESHOLD, ApproximateCount, PlanRowEstimate};
use crate::model::{
    Batch, BatchId, BatchLookup, DataSet, DataSetId, DataSetLookup, DataSetSummary, NewBatch,
    NewDataSet, NewRecord, Record, RecordId, RecordLookup,
};
use crate::schema;
use chrono::{DateTime, Utc};
use snapsync_store::{Store, StoreConfig, Table, Transaction};
use tracing::info;

struct Tables {
    dataset: Table,
    dataset_name_idx: Table,
    batch: Table,
    batch_key_idx: Table,
    record: Table,
    record_local_id_idx: Table,
    record_dataset_idx: Table,
    record_batch_idx: Table,
}

/// System of record for dataset/batch/record lifecycle state.
pub struct Ledger {
    store: Store,
    tables: Tables,
    estimator: Box<dyn ApproximateCount>,
}

impl Ledger {
    /// Open a ledger over a store at the configured directory.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::new(Store::open(config)?)
    }

    pub fn new(store: Store) -> Result<Self> {
        let tables = Tables {
            dataset: store.table(schema::DATASET)?,
            dataset_name_idx: store.table(schema::DATASET_NAME_IDX)?,
            batch: store.table(schema::BATCH)?,
            batch_key_idx: store.table(schema::BATCH_KEY_IDX)?,
            record: store.table(schema::RECORD)?,
            record_local_id_idx: store.table(schema::RECORD_LOCAL_ID_IDX)?,
            record_dataset_idx: store.table(schema::RECORD_DATASET_IDX)?,
            record_batch_idx: store.table(schema::RECORD_BATCH_IDX)?,
        };
        Ok(Self {
            store,
            tables,
            estimator: Box::new(PlanRowEstimate),
        })
    }

    /// Replace the approximate-count strategy.
    pub fn with_estimator(mut self, estimator: Box<dyn ApproximateCount>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Begin a transaction for the operations that take one.
    pub fn begin(&self) -> Transaction<'_> {
        self.store.begin()
    }

    /// Dedicated transaction for operations that must commit independently
    /// of any surrounding unit of work. Transactions are exclusive, so
    /// nesting inside an open one is an illegal state, not a wait.
    fn begin_dedicated(&self, operation: &'static str) -> Result<Transaction<'_>> {
        self.store.try_begin().ok_or_else(|| {
            Error::IllegalState(format!(
                "{operation} requires a dedicated transaction but another transaction is open"
            ))
        })
    }

    // ------------------------------------------------------------------
    // Datasets
    // ------------------------------------------------------------------

    /// Persist a dataset in its own dedicated transaction, durable
    /// independently of any surrounding unit of work.
    ///
    /// Fails fast with [`Error::IllegalState`] when a transaction is already
    /// open; the dedicated transaction cannot nest inside it.
    pub fn create_data_set(&self, new: &NewDataSet) -> Result<DataSet> {
        let mut txn = self.begin_dedicated("create_data_set")?;

        if txn
            .get(&self.tables.dataset_name_idx, &schema::name_key(&new.name))?
            .is_some()
        {
            return Err(Error::UniqueViolation {
                constraint: "dataset_name_key",
                key: new.name.clone(),
            });
        }

        let id = txn.next_id(schema::DATASET_ID_SEQ)?;
        let data_set = DataSet {
            id,
            name: new.name.clone(),
            display_name: new.display_name.clone(),
            agency_id: new.agency_id,
        };
        txn.put(
            &self.tables.dataset,
            schema::id_key(id),
            schema::encode_data_set(&data_set),
        );
        txn.put(
            &self.tables.dataset_name_idx,
            schema::name_key(&data_set.name),
            schema::id_key(id),
        );
        txn.commit()?;
        Ok(data_set)
    }

    /// Look up a dataset by id or unique name; `Ok(None)` when absent.
    pub fn lookup_data_set(
        &self,
        txn: &Transaction<'_>,
        lookup: DataSetLookup<'_>,
    ) -> Result<Option<DataSet>> {
        match lookup {
            DataSetLookup::Id(id) => self.fetch_data_set(txn, id),
            DataSetLookup::Name(name) => {
                match txn.get(&self.tables.dataset_name_idx, &schema::name_key(name))? {
                    Some(id_bytes) => {
                        let id = <u64 as snapsync_store::Decode>::decode(&id_bytes)?;
                        self.fetch_data_set(txn, id)
                    }
                    None => Ok(None),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Batch lifecycle
    // ------------------------------------------------------------------

    /// Persist a batch in its own dedicated transaction.
    ///
    /// A TOTAL batch additionally has its dataset marked within the same
    /// transaction: every record currently ACTIVE becomes RESET, "assumed
    /// gone until reconfirmed". Batch insert and mark either both commit or
    /// both roll back.
    ///
    /// Fails fast with [`Error::IllegalState`] when a transaction is already
    /// open; the dedicated transaction cannot nest inside it.
    pub fn create_batch(&self, new: &NewBatch) -> Result<Batch> {
        let mut txn = self.begin_dedicated("create_batch")?;

        let id = txn.next_id(schema::BATCH_ID_SEQ)?;
        let batch = Batch {
            id,
            dataset: new.dataset,
            batch_key: new.batch_key,
            batch_type: new.batch_type.clone(),
            time_of_creation: Utc::now(),
            time_of_completion: None,
            metadata: new.metadata.clone(),
        };
        txn.put(
            &self.tables.batch,
            schema::id_key(id),
            schema::encode_batch(&batch)?,
        );
        txn.put(
            &self.tables.batch_key_idx,
            schema::id_key(new.batch_key),
            schema::id_key(id),
        );

        if batch.batch_type.is_total() {
            let marked = self.mark(&mut txn, batch.dataset)?;
            info!("{} records marked by batch {}", marked, batch);
        }

        txn.commit()?;
        Ok(batch)
    }

    /// Close a batch by stamping its time of completion.
    ///
    /// A TOTAL batch is first swept in the same transaction: every record
    /// still RESET becomes DELETED with its batch pointer moved to this
    /// batch, a fresh modification time, and its checksum cleared so the
    /// next re-appearance counts as a genuine change. INCREMENTAL batches
    /// skip the sweep.
    pub fn close_batch(&self, txn: &mut Transaction<'_>, batch: &Batch) -> Result<Batch> {
        let mut stored = self.fetch_batch(txn, batch.id)?.ok_or_else(|| {
            Error::IllegalState(format!("batch {} is not persisted", batch.id))
        })?;

        if stored.batch_type.is_total() {
            let swept = self.sweep(txn, &stored)?;
            info!("{} records swept for batch {}", swept, stored);
        }

        stored.time_of_completion = Some(Utc::now());
        txn.put(
            &self.tables.batch,
            schema::id_key(stored.id),
            schema::encode_batch(&stored)?,
        );
        Ok(stored)
    }

    /// Abort a batch.
    ///
    /// A TOTAL batch first has its remaining marks undone: every record
    /// still RESET returns to ACTIVE with its batch pointer untouched, since
    /// the resync that marked it is being discarded. The batch is then
    /// closed as usual (the sweep finds nothing) and stays in history as a
    /// completed, aborted attempt.
    pub fn abort_batch(&self, txn: &mut Transaction<'_>, batch: &Batch) -> Result<Batch> {
        let stored = self.fetch_batch(txn, batch.id)?.ok_or_else(|| {
            Error::IllegalState(format!("batch {} is not persisted", batch.id))
        })?;

        if stored.batch_type.is_total() {
            let undone = self.undo_mark(txn, stored.dataset)?;
            info!("{} marks undone for batch {}", undone, stored);
        }

        self.close_batch(txn, &stored)
    }

    /// Next completed batch in the same dataset: the one with the smallest
    /// id strictly greater than `last_seen.id` and a non-null completion
    /// time. An open batch is never returned, so consumers cannot observe a
    /// half-written resync.
    pub fn get_next_batch(
        &self,
        txn: &Transaction<'_>,
        last_seen: &Batch,
    ) -> Result<Option<Batch>> {
        let Some(start) = last_seen.id.checked_add(1) else {
            return Ok(None);
        };
        for entry in txn.scan_from(&self.tables.batch, &schema::id_key(start)) {
            let (_, row) = entry?;
            let batch = schema::decode_batch(&row)?;
            if batch.dataset != last_seen.dataset {
                continue;
            }
            if batch.time_of_completion.is_some() {
                return Ok(Some(batch));
            }
        }
        Ok(None)
    }

    /// Look up a batch by id or by caller-supplied batch key.
    pub fn lookup_batch(
        &self,
        txn: &Transaction<'_>,
        lookup: BatchLookup,
    ) -> Result<Option<Batch>> {
        match lookup {
            BatchLookup::Id(id) => self.fetch_batch(txn, id),
            BatchLookup::Key(key) => {
                match txn.get(&self.tables.batch_key_idx, &schema::id_key(key))? {
                    Some(id_bytes) => {
                        let id = <u64 as snapsync_store::Decode>::decode(&id_bytes)?;
                        self.fetch_batch(txn, id)
                    }
                    None => Ok(None),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Insert a record, assigning its id and stamping both timestamps.
    ///
    /// A second record with an existing (dataset, local_id) pair fails with
    /// a unique violation; rolling the transaction back then leaves the
    /// dataset's record set unchanged.
    pub fn create_record(&self, txn: &mut Transaction<'_>, new: &NewRecord) -> Result<Record> {
        let local_key = schema::local_id_key(new.dataset, &new.local_id);
        if txn
            .get(&self.tables.record_local_id_idx, &local_key)?
            .is_some()
        {
            return Err(Error::UniqueViolation {
                constraint: "record_dataset_local_id_key",
                key: format!("({}, {})", new.dataset, new.local_id),
            });
        }

        let id = txn.next_id(schema::RECORD_ID_SEQ)?;
        let now = Utc::now();
        let record = Record {
            id,
            batch: new.batch,
            dataset: new.dataset,
            local_id: new.local_id.clone(),
            tracking_id: new.tracking_id.clone(),
            status: new.status.clone(),
            time_of_creation: now,
            time_of_last_modification: now,
            content: new.content.clone(),
            checksum: new.checksum.clone(),
        };
        txn.put(
            &self.tables.record,
            schema::id_key(id),
            schema::encode_record(&record),
        );
        txn.put(&self.tables.record_local_id_idx, local_key, schema::id_key(id));
        txn.put(
            &self.tables.record_dataset_idx,
            schema::member_key(new.dataset, id),
            Vec::new(),
        );
        txn.put(
            &self.tables.record_batch_idx,
            schema::member_key(new.batch, id),
            Vec::new(),
        );
        txn.add_statistic(
            &self.tables.record_dataset_idx,
            &schema::owner_prefix(new.dataset),
            1,
        )?;
        Ok(record)
    }

    /// Persist the given record state, restamping its modification time.
    ///
    /// Dataset and local id are immutable; status changes are the caller's
    /// to make: restoring a RESET record to ACTIVE on reconfirmation
    /// happens here, driven by the ingestion pipeline.
    pub fn update_record(&self, txn: &mut Transaction<'_>, record: &mut Record) -> Result<()> {
        let stored = self.fetch_record(txn, record.id)?.ok_or_else(|| {
            Error::IllegalState(format!("record {} is not persisted", record.id))
        })?;
        if stored.dataset != record.dataset || stored.local_id != record.local_id {
            return Err(Error::Validation(format!(
                "record {}: dataset and local id are immutable",
                record.id
            )));
        }

        record.time_of_creation = stored.time_of_creation;
        record.time_of_last_modification = Utc::now();
        if stored.batch != record.batch {
            self.move_batch_pointer(txn, record.id, stored.batch, record.batch);
        }
        txn.put(
            &self.tables.record,
            schema::id_key(record.id),
            schema::encode_record(record),
        );
        Ok(())
    }

    /// Look up a record by id or by its (dataset, local_id) pair.
    ///
    /// The row is always re-read from the store: records are mutated by
    /// collaborators outside this process, and a stale in-process copy must
    /// never be served on this path.
    pub fn lookup_record(
        &self,
        txn: &Transaction<'_>,
        lookup: RecordLookup<'_>,
    ) -> Result<Option<Record>> {
        match lookup {
            RecordLookup::Id(id) => self.fetch_record(txn, id),
            RecordLookup::LocalId { dataset, local_id } => {
                let key = schema::local_id_key(dataset, local_id);
                match txn.get(&self.tables.record_local_id_idx, &key)? {
                    Some(id_bytes) => {
                        let id = <u64 as snapsync_store::Decode>::decode(&id_bytes)?;
                        self.fetch_record(txn, id)
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Batch lookup by local id; the result is positionally parallel to
    /// `local_ids`, with `None` for pairs not present.
    pub fn lookup_records_by_local_ids(
        &self,
        txn: &Transaction<'_>,
        dataset: DataSetId,
        local_ids: &[&str],
    ) -> Result<Vec<Option<Record>>> {
        local_ids
            .iter()
            .copied()
            .map(|local_id| self.lookup_record(txn, RecordLookup::LocalId { dataset, local_id }))
            .collect()
    }

    /// Move the record under `batch` and take over `checksum`, unless the
    /// stored checksum already matches, in which case nothing is touched:
    /// unchanged content does not churn the batch pointer. A stored empty
    /// checksum counts as absent and always updates.
    ///
    /// Never touches `status`; reconfirming a RESET record back to ACTIVE
    /// is the ingestion pipeline's explicit responsibility.
    pub fn update_batch_if_modified(
        &self,
        txn: &mut Transaction<'_>,
        record: &mut Record,
        batch: &Batch,
        checksum: &str,
    ) -> Result<bool> {
        let mut stored = self.fetch_record(txn, record.id)?.ok_or_else(|| {
            Error::IllegalState(format!("record {} is not persisted", record.id))
        })?;

        if !stored.checksum.is_empty() && stored.checksum == checksum {
            *record = stored;
            return Ok(false);
        }

        let old_batch = stored.batch;
        stored.batch = batch.id;
        stored.checksum = checksum.to_string();
        stored.time_of_last_modification = Utc::now();
        if old_batch != stored.batch {
            self.move_batch_pointer(txn, stored.id, old_batch, stored.batch);
        }
        txn.put(
            &self.tables.record,
            schema::id_key(stored.id),
            schema::encode_record(&stored),
        );
        *record = stored;
        Ok(true)
    }

    /// Stream all records whose batch pointer is `batch`, in ascending
    /// record-id order.
    pub fn records_in_batch<'t, 's>(
        &'t self,
        txn: &'t Transaction<'s>,
        batch: BatchId,
    ) -> Result<RecordCursor<'t, 's>> {
        let scan = txn.scan_prefix(&self.tables.record_batch_idx, &schema::owner_prefix(batch));
        Cursor::new(txn, &self.tables.record, scan, schema::decode_record)
    }

    /// Stream all records in a dataset, in ascending record-id order.
    pub fn records_in_data_set<'t, 's>(
        &'t self,
        txn: &'t Transaction<'s>,
        dataset: DataSetId,
    ) -> Result<RecordCursor<'t, 's>> {
        let scan = txn.scan_prefix(
            &self.tables.record_dataset_idx,
            &schema::owner_prefix(dataset),
        );
        Cursor::new(txn, &self.tables.record, scan, schema::decode_record)
    }

    /// Delete every record in the batch's dataset whose modification time is
    /// strictly before `cut_off`, pruning records no ingestion has
    /// reconfirmed for a long time, the maintenance path for datasets that
    /// never run a TOTAL resync. Returns the number of records deleted.
    pub fn delete_outdated_records_in_batch(
        &self,
        txn: &mut Transaction<'_>,
        batch: &Batch,
        cut_off: DateTime<Utc>,
    ) -> Result<u64> {
        let ids = self.member_ids(txn, &self.tables.record_dataset_idx, batch.dataset)?;
        let now = Utc::now();
        let mut deleted = 0u64;
        for id in ids {
            let mut record = self.expect_record(txn, id)?;
            if record.time_of_last_modification >= cut_off {
                continue;
            }
            let old_batch = record.batch;
            record.batch = batch.id;
            record.status = RecordStatus::Deleted;
            record.checksum = String::new();
            record.time_of_last_modification = now;
            if old_batch != batch.id {
                self.move_batch_pointer(txn, id, old_batch, batch.id);
            }
            txn.put(
                &self.tables.record,
                schema::id_key(id),
                schema::encode_record(&record),
            );
            deleted += 1;
        }
        info!("{} outdated records deleted by batch {}", deleted, batch);
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Sizing
    // ------------------------------------------------------------------

    /// Exact number of records in the dataset.
    pub fn size_of(&self, txn: &Transaction<'_>, data_set: &DataSet) -> Result<u64> {
        let mut count = 0u64;
        for entry in txn.scan_prefix(
            &self.tables.record_dataset_idx,
            &schema::owner_prefix(data_set.id),
        ) {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Approximate number of records in the dataset.
    ///
    /// Asks the configured strategy for a planner estimate without running
    /// the count. Below [`APPROXIMATE_COUNT_THRESHOLD`] the exact count is
    /// returned instead; 0 when the dataset is absent or the estimate is
    /// unavailable.
    pub fn estimate_size_of(
        &self,
        txn: &Transaction<'_>,
        data_set: Option<&DataSet>,
    ) -> Result<u64> {
        let Some(data_set) = data_set else {
            return Ok(0);
        };
        let prefix = schema::owner_prefix(data_set.id);
        match self
            .estimator
            .approximate_count(txn, &self.tables.record_dataset_idx, &prefix)?
        {
            None => Ok(0),
            Some(approx) if approx < APPROXIMATE_COUNT_THRESHOLD => self.size_of(txn, data_set),
            Some(approx) => Ok(approx),
        }
    }

    /// Aggregate status counts for one dataset.
    pub fn data_set_summary(
        &self,
        txn: &Transaction<'_>,
        data_set: &DataSet,
    ) -> Result<DataSetSummary> {
        let mut summary = DataSetSummary {
            name: data_set.name.clone(),
            total: 0,
            active: 0,
            deleted: 0,
            reset: 0,
            time_of_last_modification: None,
            batch_id: 0,
        };
        for entry in txn.scan_prefix(
            &self.tables.record_dataset_idx,
            &schema::owner_prefix(data_set.id),
        ) {
            let (key, _) = entry?;
            let id = schema::record_id_from_member_key(&key)?;
            let record = self.expect_record(txn, id)?;
            summary.total += 1;
            match record.status {
                RecordStatus::Active => summary.active += 1,
                RecordStatus::Deleted => summary.deleted += 1,
                RecordStatus::Reset => summary.reset += 1,
                RecordStatus::Unrecognized(_) => {}
            }
            if summary
                .time_of_last_modification
                .map_or(true, |t| t < record.time_of_last_modification)
            {
                summary.time_of_last_modification = Some(record.time_of_last_modification);
            }
            summary.batch_id = summary.batch_id.max(record.batch);
        }
        Ok(summary)
    }

    /// Aggregate status counts for every dataset.
    pub fn data_set_summaries(&self, txn: &Transaction<'_>) -> Result<Vec<DataSetSummary>> {
        let mut summaries = Vec::new();
        for entry in txn.scan_prefix(&self.tables.dataset, &[]) {
            let (_, row) = entry?;
            let data_set = schema::decode_data_set(&row)?;
            summaries.push(self.data_set_summary(txn, &data_set)?);
        }
        Ok(summaries)
    }

    // ------------------------------------------------------------------
    // Mark-sweep phases
    // ------------------------------------------------------------------

    /// Bulk-transition every ACTIVE record in the dataset to RESET.
    fn mark(&self, txn: &mut Transaction<'_>, dataset: DataSetId) -> Result<u64> {
        let ids = self.member_ids(txn, &self.tables.record_dataset_idx, dataset)?;
        let mut marked = 0u64;
        for id in ids {
            let mut record = self.expect_record(txn, id)?;
            if record.status != RecordStatus::Active {
                continue;
            }
            record.status = RecordStatus::Reset;
            txn.put(
                &self.tables.record,
                schema::id_key(id),
                schema::encode_record(&record),
            );
            marked += 1;
        }
        Ok(marked)
    }

    /// Bulk-transition every record still RESET to DELETED under `batch`,
    /// clearing its checksum and restamping its modification time.
    fn sweep(&self, txn: &mut Transaction<'_>, batch: &Batch) -> Result<u64> {
        let ids = self.member_ids(txn, &self.tables.record_dataset_idx, batch.dataset)?;
        let now = Utc::now();
        let mut swept = 0u64;
        for id in ids {
            let mut record = self.expect_record(txn, id)?;
            if record.status != RecordStatus::Reset {
                continue;
            }
            let old_batch = record.batch;
            record.batch = batch.id;
            record.status = RecordStatus::Deleted;
            record.checksum = String::new();
            record.time_of_last_modification = now;
            if old_batch != batch.id {
                self.move_batch_pointer(txn, id, old_batch, batch.id);
            }
            txn.put(
                &self.tables.record,
                schema::id_key(id),
                schema::encode_record(&record),
            );
            swept += 1;
        }
        Ok(swept)
    }

    /// Bulk-transition every record still RESET back to ACTIVE, leaving its
    /// batch pointer untouched.
    fn undo_mark(&self, txn: &mut Transaction<'_>, dataset: DataSetId) -> Result<u64> {
        let ids = self.member_ids(txn, &self.tables.record_dataset_idx, dataset)?;
        let mut undone = 0u64;
        for id in ids {
            let mut record = self.expect_record(txn, id)?;
            if record.status != RecordStatus::Reset {
                continue;
            }
            record.status = RecordStatus::Active;
            txn.put(
                &self.tables.record,
                schema::id_key(id),
                schema::encode_record(&record),
            );
            undone += 1;
        }
        Ok(undone)
    }

    // ------------------------------------------------------------------
    // Row access helpers
    // ------------------------------------------------------------------

    fn fetch_data_set(&self, txn: &Transaction<'_>, id: DataSetId) -> Result<Option<DataSet>> {
        match txn.get(&self.tables.dataset, &schema::id_key(id))? {
            Some(row) => Ok(Some(schema::decode_data_set(&row)?)),
            None => Ok(None),
        }
    }

    fn fetch_batch(&self, txn: &Transaction<'_>, id: BatchId) -> Result<Option<Batch>> {
        match txn.get(&self.tables.batch, &schema::id_key(id))? {
            Some(row) => Ok(Some(schema::decode_batch(&row)?)),
            None => Ok(None),
        }
    }

    fn fetch_record(&self, txn: &Transaction<'_>, id: RecordId) -> Result<Option<Record>> {
        match txn.get(&self.tables.record, &schema::id_key(id))? {
            Some(row) => Ok(Some(schema::decode_record(&row)?)),
            None => Ok(None),
        }
    }

    fn expect_record(&self, txn: &Transaction<'_>, id: RecordId) -> Result<Record> {
        self.fetch_record(txn, id)?
            .ok_or_else(|| Error::IllegalState(format!("record {id} is indexed but has no row")))
    }

    /// All record ids under an owner prefix of a membership index.
    fn member_ids(
        &self,
        txn: &Transaction<'_>,
        index: &Table,
        owner: u64,
    ) -> Result<Vec<RecordId>> {
        let mut ids = Vec::new();
        for entry in txn.scan_prefix(index, &schema::owner_prefix(owner)) {
            let (key, _) = entry?;
            ids.push(schema::record_id_from_member_key(&key)?);
        }
        Ok(ids)
    }

    /// Re-home a record's membership entry when its batch pointer moves.
    fn move_batch_pointer(
        &self,
        txn: &mut Transaction<'_>,
        record: RecordId,
        from: BatchId,
        to: BatchId,
    ) {
        txn.delete(&self.tables.record_batch_idx, schema::member_key(from, record));
        txn.put(
            &self.tables.record_batch_idx,
            schema::member_key(to, record),
            Vec::new(),
        );
    }
}
