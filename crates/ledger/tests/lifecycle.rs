//! Batch lifecycle: mark on create, sweep on close, undo-mark on abort.

use snapsync_ledger::{
    Batch, BatchType, DataSet, DataSetLookup, Error, Ledger, NewBatch, NewDataSet, NewRecord,
    Record, RecordLookup, RecordStatus, StoreConfig,
};
use tempfile::TempDir;

fn open_ledger() -> (TempDir, Ledger) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open(StoreConfig::new(dir.path())).unwrap();
    (dir, ledger)
}

fn make_data_set(ledger: &Ledger, name: &str) -> DataSet {
    ledger
        .create_data_set(&NewDataSet {
            name: name.to_string(),
            display_name: None,
            agency_id: 870970,
        })
        .unwrap()
}

fn make_batch(ledger: &Ledger, data_set: &DataSet, key: u64, batch_type: BatchType) -> Batch {
    ledger
        .create_batch(&NewBatch {
            dataset: data_set.id,
            batch_key: key,
            batch_type,
            metadata: None,
        })
        .unwrap()
}

fn add_record(
    ledger: &Ledger,
    txn: &mut snapsync_ledger::Transaction<'_>,
    data_set: &DataSet,
    batch: &Batch,
    local_id: &str,
    checksum: &str,
) -> Record {
    ledger
        .create_record(
            txn,
            &NewRecord {
                dataset: data_set.id,
                batch: batch.id,
                local_id: local_id.to_string(),
                tracking_id: format!("t-{local_id}"),
                status: RecordStatus::Active,
                content: local_id.as_bytes().to_vec(),
                checksum: checksum.to_string(),
            },
        )
        .unwrap()
}

fn status_of(ledger: &Ledger, data_set: &DataSet, local_id: &str) -> (RecordStatus, u64) {
    let txn = ledger.begin();
    let record = ledger
        .lookup_record(
            &txn,
            RecordLookup::LocalId {
                dataset: data_set.id,
                local_id,
            },
        )
        .unwrap()
        .unwrap();
    (record.status, record.batch)
}

#[test]
fn data_set_is_found_by_id_and_by_name() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "library-870970");

    let txn = ledger.begin();
    let by_id = ledger
        .lookup_data_set(&txn, DataSetLookup::Id(data_set.id))
        .unwrap();
    let by_name = ledger
        .lookup_data_set(&txn, DataSetLookup::Name("library-870970"))
        .unwrap();
    let absent = ledger
        .lookup_data_set(&txn, DataSetLookup::Name("no-such-set"))
        .unwrap();

    assert_eq!(by_id, Some(data_set.clone()));
    assert_eq!(by_name, Some(data_set));
    assert_eq!(absent, None);
}

#[test]
fn duplicate_data_set_name_is_rejected() {
    let (_dir, ledger) = open_ledger();
    make_data_set(&ledger, "library-870970");

    let err = ledger
        .create_data_set(&NewDataSet {
            name: "library-870970".to_string(),
            display_name: Some("twin".to_string()),
            agency_id: 870971,
        })
        .unwrap_err();
    assert!(matches!(err, Error::UniqueViolation { .. }));
}

#[test]
fn incremental_batch_does_not_mark_the_dataset() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let seed = make_batch(&ledger, &data_set, 1, BatchType::Incremental);

    let mut txn = ledger.begin();
    add_record(&ledger, &mut txn, &data_set, &seed, "r1", "c1");
    txn.commit().unwrap();

    make_batch(&ledger, &data_set, 2, BatchType::Incremental);

    assert_eq!(status_of(&ledger, &data_set, "r1").0, RecordStatus::Active);
}

#[test]
fn total_batch_lifecycle_marks_reconfirms_and_sweeps() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let seed = make_batch(&ledger, &data_set, 1, BatchType::Incremental);

    let mut txn = ledger.begin();
    add_record(&ledger, &mut txn, &data_set, &seed, "r1", "c1");
    add_record(&ledger, &mut txn, &data_set, &seed, "r2", "c2");
    add_record(&ledger, &mut txn, &data_set, &seed, "r3", "c3");
    txn.commit().unwrap();

    // Mark: creating the TOTAL batch resets every active record.
    let total = make_batch(&ledger, &data_set, 2, BatchType::Total);
    for local_id in ["r1", "r2", "r3"] {
        assert_eq!(status_of(&ledger, &data_set, local_id).0, RecordStatus::Reset);
    }

    // The pipeline reconfirms r1 unchanged and r2 with new content; r3 is
    // never seen again.
    let mut txn = ledger.begin();
    let mut r1 = ledger
        .lookup_record(&txn, RecordLookup::LocalId { dataset: data_set.id, local_id: "r1" })
        .unwrap()
        .unwrap();
    let unchanged = ledger
        .update_batch_if_modified(&mut txn, &mut r1, &total, "c1")
        .unwrap();
    assert!(!unchanged);
    r1.status = RecordStatus::Active;
    ledger.update_record(&mut txn, &mut r1).unwrap();

    let mut r2 = ledger
        .lookup_record(&txn, RecordLookup::LocalId { dataset: data_set.id, local_id: "r2" })
        .unwrap()
        .unwrap();
    let changed = ledger
        .update_batch_if_modified(&mut txn, &mut r2, &total, "c2-v2")
        .unwrap();
    assert!(changed);
    r2.status = RecordStatus::Active;
    ledger.update_record(&mut txn, &mut r2).unwrap();

    // Sweep: closing flips the never-reconfirmed record to deleted.
    let closed = ledger.close_batch(&mut txn, &total).unwrap();
    txn.commit().unwrap();
    assert!(!closed.is_open());

    assert_eq!(
        status_of(&ledger, &data_set, "r1"),
        (RecordStatus::Active, seed.id)
    );
    assert_eq!(
        status_of(&ledger, &data_set, "r2"),
        (RecordStatus::Active, total.id)
    );
    let (r3_status, r3_batch) = status_of(&ledger, &data_set, "r3");
    assert_eq!(r3_status, RecordStatus::Deleted);
    assert_eq!(r3_batch, total.id);

    // The swept record's checksum is cleared so a later re-appearance
    // always counts as modified.
    let txn = ledger.begin();
    let r3 = ledger
        .lookup_record(&txn, RecordLookup::LocalId { dataset: data_set.id, local_id: "r3" })
        .unwrap()
        .unwrap();
    assert!(r3.checksum.is_empty());
}

#[test]
fn aborting_a_total_batch_restores_marked_records() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let seed = make_batch(&ledger, &data_set, 1, BatchType::Incremental);

    let mut txn = ledger.begin();
    add_record(&ledger, &mut txn, &data_set, &seed, "r1", "c1");
    add_record(&ledger, &mut txn, &data_set, &seed, "r2", "c2");
    txn.commit().unwrap();

    let total = make_batch(&ledger, &data_set, 2, BatchType::Total);
    assert_eq!(status_of(&ledger, &data_set, "r1").0, RecordStatus::Reset);

    let mut txn = ledger.begin();
    let aborted = ledger.abort_batch(&mut txn, &total).unwrap();
    txn.commit().unwrap();

    // Records are back as they were, batch pointers untouched.
    assert_eq!(
        status_of(&ledger, &data_set, "r1"),
        (RecordStatus::Active, seed.id)
    );
    assert_eq!(
        status_of(&ledger, &data_set, "r2"),
        (RecordStatus::Active, seed.id)
    );

    // The aborted batch still completes and remains visible to consumers.
    assert!(!aborted.is_open());
    let txn = ledger.begin();
    let next = ledger.get_next_batch(&txn, &seed).unwrap().unwrap();
    assert_eq!(next.id, total.id);
}

#[test]
fn get_next_batch_skips_open_batches_and_other_datasets() {
    let (_dir, ledger) = open_ledger();
    let ds_a = make_data_set(&ledger, "a");
    let ds_b = make_data_set(&ledger, "b");

    let a1 = make_batch(&ledger, &ds_a, 1, BatchType::Incremental);
    let b1 = make_batch(&ledger, &ds_b, 2, BatchType::Incremental);
    let a2 = make_batch(&ledger, &ds_a, 3, BatchType::Incremental);
    let a3 = make_batch(&ledger, &ds_a, 4, BatchType::Incremental);

    // Close b1 and a3; a2 stays open.
    let mut txn = ledger.begin();
    ledger.close_batch(&mut txn, &b1).unwrap();
    ledger.close_batch(&mut txn, &a3).unwrap();
    txn.commit().unwrap();

    let txn = ledger.begin();
    let next = ledger.get_next_batch(&txn, &a1).unwrap().unwrap();
    assert_eq!(next.id, a3.id);
    assert_ne!(next.id, a2.id);

    // Nothing completed after a3 in its dataset.
    assert!(ledger.get_next_batch(&txn, &a3).unwrap().is_none());
}

#[test]
fn closing_an_unpersisted_batch_is_an_illegal_state() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let mut phantom = make_batch(&ledger, &data_set, 1, BatchType::Incremental);
    phantom.id += 1000;

    let mut txn = ledger.begin();
    let err = ledger.close_batch(&mut txn, &phantom).unwrap_err();
    assert!(matches!(err, Error::IllegalState(_)));
}

#[test]
fn batch_is_found_by_its_caller_supplied_key() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let batch = make_batch(&ledger, &data_set, 5001, BatchType::Incremental);

    let txn = ledger.begin();
    let by_key = ledger
        .lookup_batch(&txn, snapsync_ledger::BatchLookup::Key(5001))
        .unwrap();
    assert_eq!(by_key.map(|b| b.id), Some(batch.id));
    assert!(ledger
        .lookup_batch(&txn, snapsync_ledger::BatchLookup::Key(9999))
        .unwrap()
        .is_none());
}

#[test]
fn delete_outdated_removes_only_records_older_than_the_cut_off() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let seed = make_batch(&ledger, &data_set, 1, BatchType::Incremental);

    let mut txn = ledger.begin();
    add_record(&ledger, &mut txn, &data_set, &seed, "old-1", "c1");
    add_record(&ledger, &mut txn, &data_set, &seed, "old-2", "c2");
    txn.commit().unwrap();

    let cleanup = make_batch(&ledger, &data_set, 2, BatchType::Incremental);

    // A cut-off in the past touches nothing.
    let mut txn = ledger.begin();
    let past = chrono::Utc::now() - chrono::Duration::hours(1);
    assert_eq!(
        ledger
            .delete_outdated_records_in_batch(&mut txn, &cleanup, past)
            .unwrap(),
        0
    );
    txn.rollback();

    // A cut-off in the future deletes everything under the cleanup batch.
    let mut txn = ledger.begin();
    let future = chrono::Utc::now() + chrono::Duration::hours(1);
    assert_eq!(
        ledger
            .delete_outdated_records_in_batch(&mut txn, &cleanup, future)
            .unwrap(),
        2
    );
    txn.commit().unwrap();

    assert_eq!(
        status_of(&ledger, &data_set, "old-1"),
        (RecordStatus::Deleted, cleanup.id)
    );
}

#[test]
fn registration_inside_an_open_transaction_fails_fast() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");

    // Dataset and batch creation need a dedicated transaction; inside an
    // open one they must refuse instead of waiting on the writer lock.
    let txn = ledger.begin();
    let err = ledger
        .create_batch(&NewBatch {
            dataset: data_set.id,
            batch_key: 1,
            batch_type: BatchType::Incremental,
            metadata: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::IllegalState(_)));

    let err = ledger
        .create_data_set(&NewDataSet {
            name: "other".to_string(),
            display_name: None,
            agency_id: 870970,
        })
        .unwrap_err();
    assert!(matches!(err, Error::IllegalState(_)));
    drop(txn);

    // Once the transaction is finished, registration succeeds again.
    make_batch(&ledger, &data_set, 1, BatchType::Incremental);
    make_data_set(&ledger, "other");
}

#[test]
fn get_next_batch_at_the_id_ceiling_finds_nothing() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let mut ceiling = make_batch(&ledger, &data_set, 1, BatchType::Incremental);
    ceiling.id = u64::MAX;

    let txn = ledger.begin();
    assert!(ledger.get_next_batch(&txn, &ceiling).unwrap().is_none());
}

#[test]
fn ten_record_total_resync_close_and_abort_scenario() {
    let (_dir, ledger) = open_ledger();

    // Close path: all ten unconfirmed records are swept.
    let d1 = make_data_set(&ledger, "D1");
    let b0 = make_batch(&ledger, &d1, 1, BatchType::Incremental);
    let mut txn = ledger.begin();
    for i in 1..=10 {
        add_record(&ledger, &mut txn, &d1, &b0, &format!("r{i}"), &format!("c{i}"));
    }
    txn.commit().unwrap();

    let b1 = ledger
        .create_batch(&NewBatch {
            dataset: d1.id,
            batch_key: 5001,
            batch_type: BatchType::Total,
            metadata: None,
        })
        .unwrap();
    assert!(b1.is_open());
    for i in 1..=10 {
        assert_eq!(
            status_of(&ledger, &d1, &format!("r{i}")),
            (RecordStatus::Reset, b0.id)
        );
    }

    let mut txn = ledger.begin();
    let closed = ledger.close_batch(&mut txn, &b1).unwrap();
    txn.commit().unwrap();
    assert!(!closed.is_open());
    let txn = ledger.begin();
    for i in 1..=10 {
        let record = ledger
            .lookup_record(
                &txn,
                RecordLookup::LocalId {
                    dataset: d1.id,
                    local_id: &format!("r{i}"),
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(record.status, RecordStatus::Deleted);
        assert_eq!(record.batch, b1.id);
        assert!(record.checksum.is_empty());
    }
    drop(txn);

    // Abort path on a fresh identical dataset: all ten restored untouched.
    let d2 = make_data_set(&ledger, "D2");
    let b0 = make_batch(&ledger, &d2, 2, BatchType::Incremental);
    let mut txn = ledger.begin();
    for i in 1..=10 {
        add_record(&ledger, &mut txn, &d2, &b0, &format!("r{i}"), &format!("c{i}"));
    }
    txn.commit().unwrap();

    let b1 = make_batch(&ledger, &d2, 5002, BatchType::Total);
    let mut txn = ledger.begin();
    let aborted = ledger.abort_batch(&mut txn, &b1).unwrap();
    txn.commit().unwrap();
    assert!(!aborted.is_open());
    for i in 1..=10 {
        assert_eq!(
            status_of(&ledger, &d2, &format!("r{i}")),
            (RecordStatus::Active, b0.id)
        );
    }
}

#[test]
fn data_set_summary_tallies_statuses() {
    let (_dir, ledger) = open_ledger();
    let data_set = make_data_set(&ledger, "ds");
    let seed = make_batch(&ledger, &data_set, 1, BatchType::Incremental);

    let mut txn = ledger.begin();
    add_record(&ledger, &mut txn, &data_set, &seed, "r1", "c1");
    add_record(&ledger, &mut txn, &data_set, &seed, "r2", "c2");
    add_record(&ledger, &mut txn, &data_set, &seed, "r3", "c3");
    txn.commit().unwrap();

    // Leave r3 to the sweep of a TOTAL batch, reconfirm the others.
    let total = make_batch(&ledger, &data_set, 2, BatchType::Total);
    let mut txn = ledger.begin();
    for local_id in ["r1", "r2"] {
        let mut record = ledger
            .lookup_record(&txn, RecordLookup::LocalId { dataset: data_set.id, local_id })
            .unwrap()
            .unwrap();
        record.status = RecordStatus::Active;
        ledger.update_record(&mut txn, &mut record).unwrap();
    }
    ledger.close_batch(&mut txn, &total).unwrap();
    txn.commit().unwrap();

    let txn = ledger.begin();
    let summary = ledger.data_set_summary(&txn, &data_set).unwrap();
    assert_eq!(summary.name, "ds");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.active, 2);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.reset, 0);
    assert_eq!(summary.batch_id, total.id);
    assert!(summary.time_of_last_modification.is_some());

    let summaries = ledger.data_set_summaries(&txn).unwrap();
    assert_eq!(summaries, vec![summary]);
}
