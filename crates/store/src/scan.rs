//! Ordered merge of buffered and committed entries
//!
//! Mirrors the committed/uncommitted two-way merge used for table scans:
//! both inputs are already in ascending key order, and on a key collision
//! the transaction's own write wins (a buffered delete hides the committed
//! entry).

use crate::BackendIter;
use crate::error::{Error, Result};

pub struct ScanIter<'t> {
    committed: BackendIter<'t>,
    buffered_committed: Option<(Box<[u8]>, Box<[u8]>)>,
    overlay: std::vec::IntoIter<(Vec<u8>, Option<Vec<u8>>)>,
    buffered_overlay: Option<(Vec<u8>, Option<Vec<u8>>)>,
}

impl<'t> ScanIter<'t> {
    pub(crate) fn new(
        committed: BackendIter<'t>,
        overlay: Vec<(Vec<u8>, Option<Vec<u8>>)>,
    ) -> Self {
        Self {
            committed,
            buffered_committed: None,
            overlay: overlay.into_iter(),
            buffered_overlay: None,
        }
    }

    fn peek_committed(&mut self) -> Result<Option<&(Box<[u8]>, Box<[u8]>)>> {
        if self.buffered_committed.is_none() {
            match self.committed.next() {
                Some(Ok(entry)) => self.buffered_committed = Some(entry),
                Some(Err(e)) => return Err(Error::Backend(e)),
                None => {}
            }
        }
        Ok(self.buffered_committed.as_ref())
    }

    fn peek_overlay(&mut self) -> Option<&(Vec<u8>, Option<Vec<u8>>)> {
        if self.buffered_overlay.is_none() {
            self.buffered_overlay = self.overlay.next();
        }
        self.buffered_overlay.as_ref()
    }
}

impl<'t> Iterator for ScanIter<'t> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let committed_key = match self.peek_committed() {
                Ok(entry) => entry.map(|(k, _)| k.to_vec()),
                Err(e) => return Some(Err(e)),
            };
            let overlay_key = self.peek_overlay().map(|(k, _)| k.clone());

            match (overlay_key, committed_key) {
                (None, None) => return None,
                // Only committed data left
                (None, Some(_)) => {
                    let (k, v) = self.buffered_committed.take()?;
                    return Some(Ok((k.into_vec(), v.into_vec())));
                }
                // Only buffered writes left; skip buffered deletes
                (Some(_), None) => {
                    let (k, entry) = self.buffered_overlay.take()?;
                    match entry {
                        Some(v) => return Some(Ok((k, v))),
                        None => continue,
                    }
                }
                (Some(ok), Some(ck)) => {
                    if ok < ck {
                        let (k, entry) = self.buffered_overlay.take()?;
                        match entry {
                            Some(v) => return Some(Ok((k, v))),
                            None => continue,
                        }
                    } else if ok == ck {
                        // Same key on both sides: the buffered write wins and
                        // the committed entry is consumed
                        self.buffered_committed = None;
                        let (k, entry) = self.buffered_overlay.take()?;
                        match entry {
                            Some(v) => return Some(Ok((k, v))),
                            None => continue,
                        }
                    } else {
                        let (k, v) = self.buffered_committed.take()?;
                        return Some(Ok((k.into_vec(), v.into_vec())));
                    }
                }
            }
        }
    }
}
