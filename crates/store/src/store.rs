//! Keyspace management and transaction entry point

use crate::StoreConfig;
use crate::error::Result;
use crate::transaction::Transaction;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// Partition holding sequence counters.
pub(crate) const SEQUENCES: &str = "_sequences";
/// Partition holding planner statistics.
pub(crate) const STATISTICS: &str = "_statistics";

/// Handle to a named table (one fjall partition).
#[derive(Clone)]
pub struct Table {
    name: String,
    pub(crate) partition: PartitionHandle,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Embedded transactional store.
///
/// All consistency is delegated to the transaction layer: a writer mutex
/// serializes transactions, and every transaction commits through a single
/// atomic `fjall::Batch`.
pub struct Store {
    keyspace: Keyspace,
    tables: RwLock<HashMap<String, PartitionHandle>>,
    writer: Mutex<()>,
    config: StoreConfig,
}

impl Store {
    /// Open (or create) a store at the configured directory.
    pub fn open(config: StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let keyspace = fjall::Config::new(&config.data_dir)
            .cache_size(config.block_cache_size)
            .open()?;

        let store = Self {
            keyspace,
            tables: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
            config,
        };

        // Internal partitions exist from the start so every transaction can
        // allocate ids and maintain statistics.
        store.table(SEQUENCES)?;
        store.table(STATISTICS)?;

        Ok(store)
    }

    /// Open (or create) a named table.
    pub fn table(&self, name: &str) -> Result<Table> {
        if let Some(partition) = self.tables.read().get(name) {
            return Ok(Table {
                name: name.to_string(),
                partition: partition.clone(),
            });
        }

        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?;
        self.tables
            .write()
            .insert(name.to_string(), partition.clone());

        Ok(Table {
            name: name.to_string(),
            partition,
        })
    }

    /// Begin a transaction, taking the writer lock for its whole lifetime.
    ///
    /// Transactions are exclusive: a second `begin` blocks until the first
    /// transaction commits, rolls back, or is dropped. Do not begin a nested
    /// transaction while one is alive on the same thread.
    pub fn begin(&self) -> Transaction<'_> {
        let guard = self.writer.lock();
        Transaction::new(self, guard)
    }

    /// Begin a transaction only if the writer lock is free.
    ///
    /// For callers that need a transaction of their own and must not wait
    /// behind an already-open one; returns `None` when any transaction is
    /// currently alive.
    pub fn try_begin(&self) -> Option<Transaction<'_>> {
        self.writer
            .try_lock()
            .map(|guard| Transaction::new(self, guard))
    }

    pub(crate) fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let _ = self.keyspace.persist(fjall::PersistMode::SyncAll);
    }
}
