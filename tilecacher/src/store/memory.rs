//! In-memory tile store.
//!
//! Backed by a dashmap of partitions, each itself a dashmap keyed by
//! [`TileKey`] string. Lock-free for the common read path and safe to share
//! across async tasks behind an `Arc`. Nothing persists beyond the process;
//! this provider exists for tests and for ephemeral caching sessions.

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::{StoreError, TileKey, TileStore};

/// In-memory, partition-per-layer tile store.
pub struct MemoryTileStore {
    partitions: DashMap<String, DashMap<String, Vec<u8>>>,
    version: u32,
}

impl MemoryTileStore {
    /// Create an empty store at the given schema version.
    pub fn new(version: u32) -> Self {
        Self {
            partitions: DashMap::new(),
            version,
        }
    }

    /// Create a store with the given partitions already present, as the
    /// schema upgrade of a persistent provider would.
    pub fn with_partitions(version: u32, names: &[&str]) -> Self {
        let store = Self::new(version);
        for name in names {
            store.partitions.insert((*name).to_string(), DashMap::new());
        }
        store
    }

    /// Number of tiles stored in a partition (0 if it does not exist).
    pub fn partition_len(&self, name: &str) -> usize {
        self.partitions.get(name).map(|p| p.len()).unwrap_or(0)
    }
}

impl TileStore for MemoryTileStore {
    fn open_partition(&self, name: &str) -> BoxFuture<'_, Result<(), StoreError>> {
        let name = name.to_string();
        Box::pin(async move {
            self.partitions.entry(name).or_default();
            Ok(())
        })
    }

    fn put(
        &self,
        partition: &str,
        key: &TileKey,
        value: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let partition = partition.to_string();
        let key = key.as_str().to_string();
        Box::pin(async move {
            let part = self
                .partitions
                .get(&partition)
                .ok_or(StoreError::UnknownPartition(partition))?;
            part.insert(key, value);
            Ok(())
        })
    }

    fn get(
        &self,
        partition: &str,
        key: &TileKey,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
        let partition = partition.to_string();
        let key = key.as_str().to_string();
        Box::pin(async move {
            let part = self
                .partitions
                .get(&partition)
                .ok_or(StoreError::UnknownPartition(partition))?;
            Ok(part.get(&key).map(|v| v.value().clone()))
        })
    }

    fn delete(&self, partition: &str, key: &TileKey) -> BoxFuture<'_, Result<(), StoreError>> {
        let partition = partition.to_string();
        let key = key.as_str().to_string();
        Box::pin(async move {
            let part = self
                .partitions
                .get(&partition)
                .ok_or(StoreError::UnknownPartition(partition))?;
            part.remove(&key);
            Ok(())
        })
    }

    fn schema_version(&self) -> u32 {
        self.version
    }
}
