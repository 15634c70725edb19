//! Persistent tile stores.
//!
//! The [`TileStore`] trait is the engine's persistence contract: a
//! key/value store partitioned by layer name, holding opaque tile bytes
//! under [`TileKey`]s, with a versioned schema. Entries carry no TTL and
//! are never evicted; they persist until explicitly deleted.
//!
//! # Design
//!
//! - **Partition per layer**: one layer maps to one named partition, so
//!   tiles from different layers never collide even when their grid
//!   indices coincide.
//! - **Explicit absence**: `get` returns `Ok(None)` for a plain miss and
//!   reserves errors for real storage failures.
//! - **Dyn-compatible**: methods return `BoxFuture` so the pipeline can
//!   hold an `Arc<dyn TileStore>` and tests can substitute providers.
//! - **Versioned schema**: providers record an integer schema version.
//!   Opening at a higher version runs a one-time upgrade creating the
//!   partitions not yet present; opening at a lower version is a fatal
//!   configuration error.

mod disk;
mod key;
mod memory;

pub use disk::DiskTileStore;
pub use key::TileKey;
pub use memory::MemoryTileStore;

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors from tile store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failed while reading.
    #[error("store read failed: {0}")]
    Read(String),

    /// Underlying storage failed while writing (quota, I/O, …).
    #[error("store write failed: {0}")]
    Write(String),

    /// Operation against a partition that was never opened.
    #[error("unknown partition: {0}")]
    UnknownPartition(String),

    /// The store was created by a newer schema than the one requested.
    /// Fatal at open time; downgrades are not supported.
    #[error("schema downgrade not supported: stored version {stored}, requested {requested}")]
    SchemaDowngrade { stored: u32, requested: u32 },

    /// The store's schema metadata is unreadable.
    #[error("schema error: {0}")]
    Schema(String),
}

/// Layer-partitioned persistent key/value store for tile bytes.
///
/// Per-operation atomicity is assumed from the underlying storage; there is
/// no cross-operation transaction. `put` is an idempotent upsert, so a
/// duplicate fetch racing into the same key is wasteful but harmless.
/// Callers must tolerate "read absent, then later find present" races from
/// other actors.
pub trait TileStore: Send + Sync {
    /// Ensure the named partition exists. Idempotent; creates lazily.
    fn open_partition(&self, name: &str) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Upsert a tile under `key` in `partition`.
    fn put(
        &self,
        partition: &str,
        key: &TileKey,
        value: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Fetch the tile stored under `key`, or `Ok(None)` when absent.
    fn get(
        &self,
        partition: &str,
        key: &TileKey,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>>;

    /// Remove the tile stored under `key`. Removing an absent key is not an
    /// error.
    fn delete(&self, partition: &str, key: &TileKey) -> BoxFuture<'_, Result<(), StoreError>>;

    /// The schema version this store was opened at.
    fn schema_version(&self) -> u32;
}
