//! TileCacher: an offline map-tile caching engine.
//!
//! Pre-fetches and persists the map tiles covering a geographic rectangle
//! across a set of zoom levels, so the region can later be displayed
//! without network access.
//!
//! # Architecture
//!
//! ```text
//! GeoRect + zooms ──► CacheJob ──► TilePipeline ──► TileStore (partition per layer)
//!     (coord)         (queue)          │
//!                                      └──► TileOrigin (HTTP, optionally proxied)
//! ```
//!
//! - [`coord`] turns a rectangle at a zoom into the inclusive tile-index
//!   grid covering it, handling world wrap, TMS flips and zoom offsets.
//! - [`queue::CacheJob`] enumerates those coordinates and drains them one
//!   at a time, pacing after each network fetch and reporting progress.
//! - [`pipeline::TilePipeline`] resolves a single tile: serve from the
//!   store on a hit, fetch → re-encode → write-through on a miss.
//! - [`store::TileStore`] is the persistence contract: layer-partitioned
//!   key/value storage with a versioned schema, with in-memory and on-disk
//!   providers included.
//! - [`origin::TileOrigin`] produces tile bytes for a coordinate; the HTTP
//!   origin expands the layer's URL template and can route through a
//!   referrer-carrying relay.
//!
//! The host map library, the region-selection UI and the relay server are
//! external callers; this crate only emits [`events::CacheEvent`]s for
//! them to consume.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tilecacher::coord::GeoRect;
//! use tilecacher::layer::Layer;
//! use tilecacher::origin::{HttpTileOrigin, ReqwestClient};
//! use tilecacher::pipeline::TilePipeline;
//! use tilecacher::projection::SphericalMercator;
//! use tilecacher::queue::{CacheJob, QueueConfig};
//! use tilecacher::store::{MemoryTileStore, TileStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let layer = Arc::new(Layer::new(
//!     "osm",
//!     "https://tile.example.org/{z}/{x}/{y}.png",
//! ));
//! let store: Arc<dyn TileStore> = Arc::new(MemoryTileStore::new(1));
//! store.open_partition(layer.name()).await?;
//!
//! let client = Arc::new(ReqwestClient::new()?);
//! let origin = Arc::new(HttpTileOrigin::new(Arc::clone(&layer), client));
//! let pipeline = Arc::new(TilePipeline::new(
//!     Arc::clone(&layer),
//!     Arc::new(SphericalMercator),
//!     store,
//!     origin,
//! ));
//!
//! let rect = GeoRect::new(46.0, 7.0, 47.0, 8.5)?;
//! let job = CacheJob::new(pipeline, &rect, &[12, 13], QueueConfig::default());
//! let summary = job.run().await;
//! println!("cached {}/{} tiles", summary.completed, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod coord;
pub mod events;
pub mod layer;
pub mod origin;
pub mod pipeline;
pub mod projection;
pub mod queue;
pub mod store;

pub use config::{ConfigError, LayersConfig};
pub use coord::{AddressingError, GeoRect, TileCoord};
pub use events::{CacheEvent, EventReceiver, EventSender};
pub use layer::Layer;
pub use origin::{FetchError, TileOrigin};
pub use pipeline::{PipelineError, TilePipeline, TileResult};
pub use queue::{CacheJob, JobHandle, JobSummary, QueueConfig};
pub use store::{StoreError, TileKey, TileStore};
