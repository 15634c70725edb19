//! Tile fetch-or-load pipeline.
//!
//! [`TilePipeline::resolve_tile`] drives one tile coordinate through the
//! store-first lifecycle:
//!
//! ```text
//! PENDING → CHECKING ─┬─ hit ──────────────────────────► DONE
//!                     └─ miss → FETCHING → STORING ────► DONE
//!                                   │          │
//!                                   └──────────┴─► error: tile skipped
//! ```
//!
//! The coordinate is adjusted (wrap, TMS flip, zoom offset) here and only
//! here; callers enqueue raw enumeration coordinates. A hit never touches
//! the network. A miss fetches from the injected [`TileOrigin`], re-encodes
//! to the storable form, and writes through to the store. Failures are
//! per-tile: logged, reported as an error to the caller, never retried.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::encode_for_store;
use crate::coord::{adjust_coord, TileCoord};
use crate::events::{emit, CacheEvent, EventSender};
use crate::layer::Layer;
use crate::origin::{FetchError, TileOrigin};
use crate::projection::Projection;
use crate::store::{StoreError, TileKey, TileStore};

/// Outcome of a successful tile resolution.
#[derive(Debug, Clone)]
pub struct TileResult {
    /// The raw (display) coordinate the caller asked for.
    pub coord: TileCoord,
    /// The store key the tile lives under (derived from the adjusted
    /// coordinate).
    pub key: TileKey,
    /// The stored tile bytes.
    pub data: Bytes,
    /// Whether the tile came from the store without a network fetch.
    pub cache_hit: bool,
}

/// Per-tile pipeline failure. Never aborts the enclosing job.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The origin fetch or the image decode failed; the tile was skipped.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The store rejected the write; the fetched tile was skipped.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch-or-load pipeline for one layer against one store.
pub struct TilePipeline {
    layer: Arc<Layer>,
    projection: Arc<dyn Projection>,
    store: Arc<dyn TileStore>,
    origin: Arc<dyn TileOrigin>,
    events: Option<EventSender>,
}

impl TilePipeline {
    /// Create a pipeline over the injected collaborators.
    pub fn new(
        layer: Arc<Layer>,
        projection: Arc<dyn Projection>,
        store: Arc<dyn TileStore>,
        origin: Arc<dyn TileOrigin>,
    ) -> Self {
        Self {
            layer,
            projection,
            store,
            origin,
            events: None,
        }
    }

    /// Attach an event sender; every successful resolution emits
    /// [`CacheEvent::TileCached`] on it.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn layer(&self) -> &Arc<Layer> {
        &self.layer
    }

    pub fn projection(&self) -> &Arc<dyn Projection> {
        &self.projection
    }

    /// Resolve one tile: serve it from the store, or fetch and persist it.
    ///
    /// Store read failures are logged and degrade to a miss; the tile is
    /// then fetched as if it were absent. Store write failures and fetch or
    /// decode failures skip the tile.
    pub async fn resolve_tile(&self, coord: TileCoord) -> Result<TileResult, PipelineError> {
        let adjusted = adjust_coord(coord, coord.zoom, &self.layer, &*self.projection);
        let key = TileKey::from_coord(&adjusted);
        let partition = self.layer.name();

        let cached = match self.store.get(partition, &key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "store read failed, treating as miss");
                None
            }
        };

        if let Some(data) = cached {
            debug!(key = %key, "cache hit");
            let result = TileResult {
                coord,
                key,
                data: Bytes::from(data),
                cache_hit: true,
            };
            self.notify(&result);
            return Ok(result);
        }

        debug!(key = %key, origin = self.origin.name(), "cache miss, fetching");
        let raw = self.origin.fetch(&adjusted).await?;
        let encoded = encode_for_store(&raw)?;

        if let Err(e) = self
            .store
            .put(partition, &key, encoded.clone())
            .await
        {
            warn!(key = %key, error = %e, "store write failed, tile skipped");
            return Err(e.into());
        }

        let result = TileResult {
            coord,
            key,
            data: Bytes::from(encoded),
            cache_hit: false,
        };
        self.notify(&result);
        Ok(result)
    }

    fn notify(&self, result: &TileResult) {
        emit(
            self.events.as_ref(),
            CacheEvent::TileCached {
                coord: result.coord,
                data: result.data.clone(),
                cache_hit: result.cache_hit,
            },
        );
    }
}
