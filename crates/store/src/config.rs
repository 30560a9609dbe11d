//! Store configuration

use std::path::PathBuf;

/// Configuration for opening a [`crate::Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the keyspace.
    pub data_dir: PathBuf,

    /// Block cache size in bytes.
    pub block_cache_size: u64,

    /// Whether commits fsync before returning.
    pub sync_on_commit: bool,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            block_cache_size: 32 * 1024 * 1024,
            sync_on_commit: true,
        }
    }
}
