//! Disk-backed tile store.
//!
//! One directory per partition, one file per tile. Keys map to filenames by
//! replacing the commas in `"{z},{y},{x}"` with underscores and appending
//! `.tile`; the mapping is reversible, which keeps the layout inspectable
//! with ordinary shell tools.
//!
//! The schema version lives in a `VERSION` marker file at the store root.
//! Opening at a higher version than recorded runs the one-time upgrade:
//! declared partitions that do not exist yet are created and the marker is
//! rewritten. Opening at a lower version fails; downgrades are not
//! supported.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashmap::DashSet;
use futures::future::BoxFuture;
use tracing::{debug, info};

use super::{StoreError, TileKey, TileStore};

/// Name of the schema version marker file.
const VERSION_FILE: &str = "VERSION";

/// File extension for stored tiles.
const TILE_EXT: &str = "tile";

/// Filesystem tile store, partition-per-directory.
pub struct DiskTileStore {
    root: PathBuf,
    version: u32,
    partitions: DashSet<String>,
}

impl DiskTileStore {
    /// Open (or create) a store at `root` with schema version `version`.
    ///
    /// `declared_partitions` are the partitions the schema is expected to
    /// contain; missing ones are created when the version advances past the
    /// recorded one. Further partitions can still be created lazily through
    /// [`TileStore::open_partition`].
    ///
    /// # Errors
    ///
    /// [`StoreError::SchemaDowngrade`] when `version` is lower than the
    /// recorded one; [`StoreError::Schema`] when the marker file is
    /// unreadable; [`StoreError::Write`] on I/O failure.
    pub async fn open(
        root: impl Into<PathBuf>,
        version: u32,
        declared_partitions: &[String],
    ) -> Result<Self, StoreError> {
        let root = root.into();

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::Write(format!("create store root: {}", e)))?;

        let stored = read_version(&root).await?;
        if let Some(stored) = stored {
            if version < stored {
                return Err(StoreError::SchemaDowngrade {
                    stored,
                    requested: version,
                });
            }
        }

        let store = Self {
            root,
            version,
            partitions: DashSet::new(),
        };

        let upgrade_needed = stored.map_or(true, |s| version > s);
        if upgrade_needed {
            info!(
                from = stored.unwrap_or(0),
                to = version,
                "upgrading tile store schema"
            );
            for name in declared_partitions {
                store.create_partition_dir(name).await?;
            }
            write_version(&store.root, version).await?;
        } else {
            // Same version: partitions created by earlier opens are
            // discovered lazily as they are touched.
            for name in declared_partitions {
                if store.root.join(name).is_dir() {
                    store.partitions.insert(name.clone());
                }
            }
        }

        Ok(store)
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn create_partition_dir(&self, name: &str) -> Result<(), StoreError> {
        let dir = self.root.join(name);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Write(format!("create partition {}: {}", name, e)))?;
        self.partitions.insert(name.to_string());
        Ok(())
    }

    fn require_partition(&self, name: &str) -> Result<(), StoreError> {
        if self.partitions.contains(name) {
            Ok(())
        } else {
            Err(StoreError::UnknownPartition(name.to_string()))
        }
    }

    fn tile_path(&self, partition: &str, key: &TileKey) -> PathBuf {
        self.root
            .join(partition)
            .join(format!("{}.{}", key.as_str().replace(',', "_"), TILE_EXT))
    }
}

async fn read_version(root: &Path) -> Result<Option<u32>, StoreError> {
    match tokio::fs::read_to_string(root.join(VERSION_FILE)).await {
        Ok(contents) => contents
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| StoreError::Schema(format!("corrupt VERSION file: {}", e))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Read(format!("read VERSION file: {}", e))),
    }
}

async fn write_version(root: &Path, version: u32) -> Result<(), StoreError> {
    tokio::fs::write(root.join(VERSION_FILE), format!("{}\n", version))
        .await
        .map_err(|e| StoreError::Write(format!("write VERSION file: {}", e)))
}

impl TileStore for DiskTileStore {
    fn open_partition(&self, name: &str) -> BoxFuture<'_, Result<(), StoreError>> {
        let name = name.to_string();
        Box::pin(async move { self.create_partition_dir(&name).await })
    }

    fn put(
        &self,
        partition: &str,
        key: &TileKey,
        value: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let partition = partition.to_string();
        let path = self.tile_path(&partition, key);
        Box::pin(async move {
            self.require_partition(&partition)?;
            tokio::fs::write(&path, value)
                .await
                .map_err(|e| StoreError::Write(format!("{}: {}", path.display(), e)))?;
            debug!(path = %path.display(), "tile written");
            Ok(())
        })
    }

    fn get(
        &self,
        partition: &str,
        key: &TileKey,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
        let partition = partition.to_string();
        let path = self.tile_path(&partition, key);
        Box::pin(async move {
            self.require_partition(&partition)?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::Read(format!("{}: {}", path.display(), e))),
            }
        })
    }

    fn delete(&self, partition: &str, key: &TileKey) -> BoxFuture<'_, Result<(), StoreError>> {
        let partition = partition.to_string();
        let path = self.tile_path(&partition, key);
        Box::pin(async move {
            self.require_partition(&partition)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::Write(format!("{}: {}", path.display(), e))),
            }
        })
    }

    fn schema_version(&self) -> u32 {
        self.version
    }
}
