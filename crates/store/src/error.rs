//! Error types for the store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Failure in the underlying fjall keyspace
    #[error("backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded into its expected shape
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An operation was used outside its required context, e.g. a scan on a
    /// transaction that has already been committed
    #[error("illegal state: {0}")]
    IllegalState(String),
}
