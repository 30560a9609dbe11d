//! Bounded-memory streaming cursor over large record sets.
//!
//! The cursor walks a membership index in ascending record-id order and
//! resolves rows one fixed-size page at a time, so memory use is O(page
//! size) regardless of result cardinality. It is single-pass and forward
//! only.
//!
//! Construction requires a live transaction borrow, so using a cursor
//! outside one is unrepresentable; the borrow also scopes the underlying
//! scan, which is released exactly once on every exit path (exhaustion,
//! early break, or error) when the cursor drops.

use crate::error::{Error, Result};
use crate::model::Record;
use crate::schema;
use snapsync_store::{ScanIter, Table, Transaction};
use std::collections::VecDeque;

/// Rows fetched per page.
pub const PAGE_SIZE: usize = 50;

/// Forward-only iterator over rows reached through a membership index,
/// mapped into `T` by a row-mapping function.
pub struct Cursor<'t, 's, T> {
    txn: &'t Transaction<'s>,
    row_table: &'t Table,
    scan: ScanIter<'t>,
    map_row: fn(&[u8]) -> Result<T>,
    page: VecDeque<T>,
    exhausted: bool,
}

pub type RecordCursor<'t, 's> = Cursor<'t, 's, Record>;

impl<'t, 's, T> Cursor<'t, 's, T> {
    /// Build the cursor and fetch the first page, so emptiness is known up
    /// front without an extra round trip during iteration.
    pub(crate) fn new(
        txn: &'t Transaction<'s>,
        row_table: &'t Table,
        scan: ScanIter<'t>,
        map_row: fn(&[u8]) -> Result<T>,
    ) -> Result<Self> {
        let mut cursor = Self {
            txn,
            row_table,
            scan,
            map_row,
            page: VecDeque::with_capacity(PAGE_SIZE),
            exhausted: false,
        };
        cursor.fill_page()?;
        Ok(cursor)
    }

    /// True when the result set held no rows at all or has been drained.
    pub fn is_empty(&self) -> bool {
        self.page.is_empty() && self.exhausted
    }

    fn fill_page(&mut self) -> Result<()> {
        while self.page.len() < PAGE_SIZE && !self.exhausted {
            match self.scan.next() {
                Some(entry) => {
                    let (key, _) = entry?;
                    let id = schema::record_id_from_member_key(&key)?;
                    let row = self
                        .txn
                        .get(self.row_table, &schema::id_key(id))?
                        .ok_or_else(|| {
                            Error::IllegalState(format!("record {id} is indexed but has no row"))
                        })?;
                    self.page.push_back((self.map_row)(&row)?);
                }
                None => self.exhausted = true,
            }
        }
        Ok(())
    }
}

impl<'t, 's, T> Iterator for Cursor<'t, 's, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() {
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fill_page() {
                // The scan is poisoned; stop after surfacing the error.
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.page.pop_front().map(Ok)
    }
}
