//! Embedded transactional storage for the snapsync repository layer.
//!
//! This crate provides the storage contract the ledger runs against:
//! - ACID transactions with read-your-own-writes and atomic commit
//! - ordered key scans over named tables (fjall partitions)
//! - monotonic sequence allocation
//! - planner-style row estimates rendered as free-text plan descriptions
//!
//! Writes are buffered in a per-transaction overlay and applied as a single
//! `fjall::Batch` on commit, so a failed or dropped transaction leaves the
//! committed state untouched.

mod config;
pub mod encoding;
mod error;
mod plan;
mod scan;
mod store;
mod transaction;

pub use config::StoreConfig;
pub use encoding::{Decode, Encode, Reader};
pub use error::{Error, Result};
pub use scan::ScanIter;
pub use store::{Store, Table};
pub use transaction::Transaction;

/// Iterator over raw fjall entries, boxed to keep signatures readable.
pub(crate) type BackendIter<'a> =
    Box<dyn Iterator<Item = std::result::Result<(Box<[u8]>, Box<[u8]>), fjall::Error>> + 'a>;
