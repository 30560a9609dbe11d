//! Uniqueness constraints and transactional rollback behavior.

use snapsync_ledger::{
    Batch, BatchType, DataSet, Error, Ledger, NewBatch, NewDataSet, NewRecord, RecordLookup,
    RecordStatus, StoreConfig,
};
use tempfile::TempDir;

fn open_ledger() -> (TempDir, Ledger) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open(StoreConfig::new(dir.path())).unwrap();
    (dir, ledger)
}

fn setup(ledger: &Ledger, name: &str) -> (DataSet, Batch) {
    let data_set = ledger
        .create_data_set(&NewDataSet {
            name: name.to_string(),
            display_name: None,
            agency_id: 870970,
        })
        .unwrap();
    let batch = ledger
        .create_batch(&NewBatch {
            dataset: data_set.id,
            batch_key: data_set.id,
            batch_type: BatchType::Incremental,
            metadata: None,
        })
        .unwrap();
    (data_set, batch)
}

fn new_record(data_set: &DataSet, batch: &Batch, local_id: &str) -> NewRecord {
    NewRecord {
        dataset: data_set.id,
        batch: batch.id,
        local_id: local_id.to_string(),
        tracking_id: String::new(),
        status: RecordStatus::Active,
        content: Vec::new(),
        checksum: "c".to_string(),
    }
}

#[test]
fn duplicate_local_id_in_a_dataset_is_rejected() {
    let (_dir, ledger) = open_ledger();
    let (data_set, batch) = setup(&ledger, "ds");

    let mut txn = ledger.begin();
    ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap();
    txn.commit().unwrap();

    let mut txn = ledger.begin();
    let err = ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UniqueViolation {
            constraint: "record_dataset_local_id_key",
            ..
        }
    ));
}

#[test]
fn same_local_id_is_fine_across_datasets() {
    let (_dir, ledger) = open_ledger();
    let (ds_a, batch_a) = setup(&ledger, "a");
    let (ds_b, batch_b) = setup(&ledger, "b");

    let mut txn = ledger.begin();
    ledger
        .create_record(&mut txn, &new_record(&ds_a, &batch_a, "shared"))
        .unwrap();
    ledger
        .create_record(&mut txn, &new_record(&ds_b, &batch_b, "shared"))
        .unwrap();
    txn.commit().unwrap();
}

#[test]
fn rollback_after_a_unique_violation_leaves_the_dataset_unchanged() {
    let (_dir, ledger) = open_ledger();
    let (data_set, batch) = setup(&ledger, "ds");

    let mut txn = ledger.begin();
    ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap();
    txn.commit().unwrap();

    // A batch insert hits the duplicate midway and is rolled back whole.
    let mut txn = ledger.begin();
    ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r2"))
        .unwrap();
    let err = ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap_err();
    assert!(matches!(err, Error::UniqueViolation { .. }));
    txn.rollback();

    let txn = ledger.begin();
    assert_eq!(ledger.size_of(&txn, &data_set).unwrap(), 1);
    assert!(ledger
        .lookup_record(
            &txn,
            RecordLookup::LocalId {
                dataset: data_set.id,
                local_id: "r2",
            },
        )
        .unwrap()
        .is_none());
}

#[test]
fn record_identity_is_immutable() {
    let (_dir, ledger) = open_ledger();
    let (data_set, batch) = setup(&ledger, "ds");

    let mut txn = ledger.begin();
    let mut record = ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap();
    txn.commit().unwrap();

    let mut txn = ledger.begin();
    record.local_id = "renamed".to_string();
    let err = ledger.update_record(&mut txn, &mut record).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn lookup_by_local_ids_is_positional() {
    let (_dir, ledger) = open_ledger();
    let (data_set, batch) = setup(&ledger, "ds");

    let mut txn = ledger.begin();
    ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r1"))
        .unwrap();
    ledger
        .create_record(&mut txn, &new_record(&data_set, &batch, "r3"))
        .unwrap();
    txn.commit().unwrap();

    let txn = ledger.begin();
    let found = ledger
        .lookup_records_by_local_ids(&txn, data_set.id, &["r1", "r2", "r3"])
        .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].as_ref().map(|r| r.local_id.as_str()), Some("r1"));
    assert!(found[1].is_none());
    assert_eq!(found[2].as_ref().map(|r| r.local_id.as_str()), Some("r3"));
}

#[test]
fn update_moves_the_batch_pointer_index() {
    let (_dir, ledger) = open_ledger();
    let (data_set, first) = setup(&ledger, "ds");
    let second = ledger
        .create_batch(&NewBatch {
            dataset: data_set.id,
            batch_key: 99,
            batch_type: BatchType::Incremental,
            metadata: None,
        })
        .unwrap();

    let mut txn = ledger.begin();
    let mut record = ledger
        .create_record(&mut txn, &new_record(&data_set, &first, "r1"))
        .unwrap();
    txn.commit().unwrap();

    let mut txn = ledger.begin();
    let moved = ledger
        .update_batch_if_modified(&mut txn, &mut record, &second, "c-v2")
        .unwrap();
    assert!(moved);
    txn.commit().unwrap();

    let txn = ledger.begin();
    assert!(ledger.records_in_batch(&txn, first.id).unwrap().is_empty());
    let in_second: Vec<String> = ledger
        .records_in_batch(&txn, second.id)
        .unwrap()
        .map(|r| r.unwrap().local_id)
        .collect();
    assert_eq!(in_second, vec!["r1"]);
}
