//! Error taxonomy for the ledger
//!
//! Lookups signal absence with `Ok(None)`, never an error. Mutation
//! failures roll the enclosing transaction back in full; no partial writes
//! survive and nothing is retried internally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input or a null stored enum value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate key under a uniqueness constraint, e.g. a second record
    /// with the same (dataset, local_id) pair.
    #[error("unique constraint violation on {constraint}: {key}")]
    UniqueViolation {
        constraint: &'static str,
        key: String,
    },

    /// Storage engine failure, wrapped uniformly.
    #[error("persistence error: {0}")]
    Storage(#[from] snapsync_store::Error),

    /// An operation found the store in a shape it cannot act on, e.g.
    /// closing a batch that was never persisted.
    #[error("illegal state: {0}")]
    IllegalState(String),
}
