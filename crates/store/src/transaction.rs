//! Write-buffered transactions
//!
//! A transaction owns the store's writer lock and buffers every write in an
//! in-memory overlay keyed by table. Reads consult the overlay first
//! (read-your-own-writes), then committed data. Commit applies the whole
//! overlay as one atomic `fjall::Batch`; rollback or drop discards it.

use crate::encoding;
use crate::error::Result;
use crate::plan;
use crate::scan::ScanIter;
use crate::store::{SEQUENCES, STATISTICS, Store, Table};
use crate::BackendIter;
use parking_lot::MutexGuard;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

type Overlay = HashMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>;

pub struct Transaction<'s> {
    store: &'s Store,
    _writer: MutexGuard<'s, ()>,
    overlay: Overlay,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s Store, writer: MutexGuard<'s, ()>) -> Self {
        Self {
            store,
            _writer: writer,
            overlay: Overlay::new(),
        }
    }

    /// Read a key, seeing this transaction's own uncommitted writes first.
    pub fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(entries) = self.overlay.get(table.name()) {
            if let Some(entry) = entries.get(key) {
                // None is a buffered delete
                return Ok(entry.clone());
            }
        }
        Ok(table.partition.get(key)?.map(|slice| slice.to_vec()))
    }

    /// Buffer a write; visible to this transaction immediately, to others
    /// only after commit.
    pub fn put(&mut self, table: &Table, key: Vec<u8>, value: Vec<u8>) {
        self.overlay
            .entry(table.name().to_string())
            .or_default()
            .insert(key, Some(value));
    }

    /// Buffer a delete.
    pub fn delete(&mut self, table: &Table, key: Vec<u8>) {
        self.overlay
            .entry(table.name().to_string())
            .or_default()
            .insert(key, None);
    }

    /// Ordered scan over all keys sharing `prefix`, merging buffered writes
    /// with committed data.
    pub fn scan_prefix<'t>(&'t self, table: &'t Table, prefix: &[u8]) -> ScanIter<'t> {
        let overlay = self.overlay_slice(table, prefix, prefix_end(prefix));
        let committed: BackendIter<'t> =
            Box::new(table.partition.prefix(prefix.to_vec()).map(|result| {
                result.map(|(k, v)| {
                    (
                        k.to_vec().into_boxed_slice(),
                        v.to_vec().into_boxed_slice(),
                    )
                })
            }));
        ScanIter::new(committed, overlay)
    }

    /// Ordered scan over all keys at or after `start`.
    pub fn scan_from<'t>(&'t self, table: &'t Table, start: &[u8]) -> ScanIter<'t> {
        let overlay = self.overlay_slice(table, start, None);
        let committed: BackendIter<'t> =
            Box::new(table.partition.range(start.to_vec()..).map(|result| {
                result.map(|(k, v)| {
                    (
                        k.to_vec().into_boxed_slice(),
                        v.to_vec().into_boxed_slice(),
                    )
                })
            }));
        ScanIter::new(committed, overlay)
    }

    /// Allocate the next value of a named sequence.
    ///
    /// Values buffered by an aborted transaction are abandoned, never reused
    /// after a later commit, so committed ids strictly increase.
    pub fn next_id(&mut self, sequence: &str) -> Result<u64> {
        let table = self.store.table(SEQUENCES)?;
        let key = sequence.as_bytes().to_vec();
        let last = match self.get(&table, &key)? {
            Some(bytes) => <u64 as crate::Decode>::decode(&bytes)?,
            None => 0,
        };
        let next = last + 1;
        self.put(&table, key, <u64 as crate::Encode>::encode(&next)?);
        Ok(next)
    }

    /// Adjust the maintained row statistic for a table prefix.
    ///
    /// Statistics feed the planner estimate only; they carry no correctness
    /// weight and are adjusted in the same transaction as the rows they
    /// describe.
    pub fn add_statistic(&mut self, table: &Table, prefix: &[u8], delta: i64) -> Result<()> {
        let stats = self.store.table(STATISTICS)?;
        let key = statistic_key(table.name(), prefix);
        let current = match self.get(&stats, &key)? {
            Some(bytes) => <u64 as crate::Decode>::decode(&bytes)?,
            None => 0,
        };
        let updated = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u64)
        };
        self.put(&stats, key, <u64 as crate::Encode>::encode(&updated)?);
        Ok(())
    }

    /// Planner row estimate for a prefix scan, from maintained statistics.
    pub fn estimated_rows(&self, table: &Table, prefix: &[u8]) -> Result<u64> {
        let stats = self.store.table(STATISTICS)?;
        let key = statistic_key(table.name(), prefix);
        match self.get(&stats, &key)? {
            Some(bytes) => <u64 as crate::Decode>::decode(&bytes),
            None => Ok(0),
        }
    }

    /// Render the plan description for a prefix scan without executing it.
    ///
    /// The output is a single free-text line containing `rows=N`; callers
    /// that want the estimate parse it out of the text, keeping the parser a
    /// clearly isolated strategy on their side.
    pub fn explain_prefix_scan(&self, table: &Table, prefix: &[u8]) -> Result<String> {
        let rows = self.estimated_rows(table, prefix)?;
        Ok(plan::render_prefix_scan(table.name(), rows))
    }

    /// Apply all buffered writes atomically.
    pub fn commit(self) -> Result<()> {
        let mut batch = self.store.keyspace().batch();
        let mut writes = 0usize;

        for (table_name, entries) in &self.overlay {
            let table = self.store.table(table_name)?;
            for (key, entry) in entries {
                match entry {
                    Some(value) => batch.insert(&table.partition, key.clone(), value.clone()),
                    None => batch.remove(&table.partition, key.clone()),
                }
                writes += 1;
            }
        }

        batch.commit()?;
        if self.store.config().sync_on_commit {
            self.store.keyspace().persist(fjall::PersistMode::SyncAll)?;
        }

        tracing::debug!(writes, "transaction committed");
        Ok(())
    }

    /// Discard all buffered writes. Dropping the transaction has the same
    /// effect; this form exists to make the intent explicit at call sites.
    pub fn rollback(self) {
        let writes: usize = self.overlay.values().map(|m| m.len()).sum();
        tracing::debug!(writes, "transaction rolled back");
    }

    /// Overlay entries for `table` within `[start, end)`, in key order.
    fn overlay_slice(
        &self,
        table: &Table,
        start: &[u8],
        end: Option<Vec<u8>>,
    ) -> Vec<(Vec<u8>, Option<Vec<u8>>)> {
        let Some(entries) = self.overlay.get(table.name()) else {
            return Vec::new();
        };
        let upper = match end {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        entries
            .range::<Vec<u8>, _>((Bound::Included(start.to_vec()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn statistic_key(table_name: &str, prefix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(table_name.len() + 1 + prefix.len());
    encoding::put_string(&mut key, table_name);
    key.extend_from_slice(prefix);
    key
}

/// Smallest key strictly greater than every key sharing `prefix`, or `None`
/// when the prefix is all 0xff.
fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xff {
            *last += 1;
            return Some(end);
        }
        end.pop();
    }
    None
}
