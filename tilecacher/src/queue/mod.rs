//! Cache request queue.
//!
//! A [`CacheJob`] is one caching run: "persist this rectangle at these zoom
//! levels for this layer". Construction enumerates every covering tile
//! coordinate into an ordered work queue; [`CacheJob::run`] drains it
//! strictly one tile at a time through the fetch pipeline, pacing after
//! each network fetch so the tile origin is never hammered.
//!
//! Ordering is part of the contract: tiles resolve in enumeration order
//! (row-major within each zoom, zooms in the order requested), progress
//! counts are monotonic, and the sequential drain is the backpressure that
//! makes pacing effective. Do not run two jobs against the same layer and
//! store concurrently: both could race to fetch the same missing key
//! (wasteful, though harmless, since store writes are idempotent upserts).

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coord::{count_tiles, is_within_world, to_tile_index_bounds, GeoRect, TileCoord};
use crate::events::{emit, CacheEvent, EventSender};
use crate::pipeline::TilePipeline;

/// Default pause between paced (network-fetched) tiles.
pub const DEFAULT_PACE_INTERVAL: Duration = Duration::from_millis(100);

/// Tuning for the drain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Pause inserted after a tile that required a network fetch. Cache
    /// hits and failed tiles advance immediately.
    pub pace_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            pace_interval: DEFAULT_PACE_INTERVAL,
        }
    }
}

/// Point-in-time progress of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
}

/// Final accounting of a finished (or cancelled) job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    /// Tiles processed (hits + fetches + failures).
    pub completed: u64,
    /// Expected tile count reported up front.
    pub total: u64,
    /// Tiles served from the store.
    pub hits: u64,
    /// Tiles fetched from the origin and persisted.
    pub fetched: u64,
    /// Tiles skipped after a fetch or store failure.
    pub failed: u64,
    /// Whether the job stopped on cancellation before draining.
    pub cancelled: bool,
}

/// Caller-side handle for cancelling and observing a running job.
#[derive(Clone)]
pub struct JobHandle {
    token: CancellationToken,
    progress: Arc<Mutex<ProgressSnapshot>>,
}

impl JobHandle {
    /// Request cancellation. The drain loop checks before each tile; the
    /// tile in flight always completes first. Already-stored tiles stay
    /// stored (no rollback).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> ProgressSnapshot {
        *self.progress.lock()
    }
}

/// One caching run over a rectangle across a set of zoom levels.
pub struct CacheJob {
    pipeline: Arc<TilePipeline>,
    queue: VecDeque<TileCoord>,
    total: u64,
    config: QueueConfig,
    events: Option<EventSender>,
    token: CancellationToken,
    progress: Arc<Mutex<ProgressSnapshot>>,
}

impl CacheJob {
    /// Enumerate the work queue for `rect` across `zoom_levels`.
    ///
    /// Zooms outside the layer's supported range are skipped. Within each
    /// zoom, coordinates are enumerated row-major over the inclusive index
    /// bounds and filtered against the world's row extent; columns pass
    /// through unfiltered (the pipeline wraps them). The reported total is
    /// the sum of [`count_tiles`] across the accepted zooms, computed
    /// before any processing starts.
    pub fn new(
        pipeline: Arc<TilePipeline>,
        rect: &GeoRect,
        zoom_levels: &[u8],
        config: QueueConfig,
    ) -> Self {
        let layer = Arc::clone(pipeline.layer());
        let projection = Arc::clone(pipeline.projection());

        let mut queue = VecDeque::new();
        let mut total = 0u64;

        for &zoom in zoom_levels {
            if !layer.supports_zoom(zoom) {
                debug!(zoom, layer = layer.name(), "zoom outside layer range, skipped");
                continue;
            }

            total += count_tiles(rect, zoom, &layer, &*projection);

            let bounds = to_tile_index_bounds(rect, zoom, &layer, &*projection);
            for row in bounds.min_row..=bounds.max_row {
                for col in bounds.min_col..=bounds.max_col {
                    let coord = TileCoord::new(col, row, zoom);
                    if is_within_world(&coord, &layer, &*projection) {
                        queue.push_back(coord);
                    }
                }
            }
        }

        let progress = Arc::new(Mutex::new(ProgressSnapshot { completed: 0, total }));

        Self {
            pipeline,
            queue,
            total,
            config,
            events: None,
            token: CancellationToken::new(),
            progress,
        }
    }

    /// Attach an event sender for job-level notifications.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Expected tile count across all accepted zooms.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of coordinates waiting in the work queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Handle for cancelling this job from another task.
    pub fn handle(&self) -> JobHandle {
        JobHandle {
            token: self.token.clone(),
            progress: Arc::clone(&self.progress),
        }
    }

    /// Drain the queue sequentially and return the final accounting.
    ///
    /// Emits `Started` once, a `Progress` snapshot after every processed
    /// tile, and exactly one of `Completed` / `Cancelled` at the end.
    /// Per-tile failures are logged and skipped; they never abort the run.
    pub async fn run(mut self) -> JobSummary {
        let layer = Arc::clone(self.pipeline.layer());
        info!(
            layer = layer.name(),
            total = self.total,
            queued = self.queue.len(),
            "cache job started"
        );
        emit(self.events.as_ref(), CacheEvent::Started { total: self.total });

        let mut summary = JobSummary {
            completed: 0,
            total: self.total,
            hits: 0,
            fetched: 0,
            failed: 0,
            cancelled: false,
        };

        loop {
            if self.token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let Some(coord) = self.queue.pop_front() else {
                break;
            };

            let outcome = self.pipeline.resolve_tile(coord).await;
            summary.completed += 1;
            self.progress.lock().completed = summary.completed;

            let paced = match &outcome {
                Ok(result) if result.cache_hit => {
                    summary.hits += 1;
                    false
                }
                Ok(_) => {
                    summary.fetched += 1;
                    true
                }
                Err(e) => {
                    warn!(coord = %coord, error = %e, "tile skipped");
                    summary.failed += 1;
                    emit(self.events.as_ref(), CacheEvent::TileFailed { coord });
                    false
                }
            };

            emit(
                self.events.as_ref(),
                CacheEvent::Progress {
                    completed: summary.completed,
                    total: summary.total,
                },
            );

            if paced && !self.queue.is_empty() {
                tokio::time::sleep(self.config.pace_interval).await;
            }
        }

        if summary.cancelled {
            info!(
                layer = layer.name(),
                completed = summary.completed,
                total = summary.total,
                "cache job cancelled"
            );
            emit(
                self.events.as_ref(),
                CacheEvent::Cancelled {
                    completed: summary.completed,
                    total: summary.total,
                },
            );
        } else {
            info!(
                layer = layer.name(),
                completed = summary.completed,
                hits = summary.hits,
                fetched = summary.fetched,
                failed = summary.failed,
                "cache job completed"
            );
            emit(
                self.events.as_ref(),
                CacheEvent::Completed {
                    completed: summary.completed,
                    total: summary.total,
                },
            );
        }

        summary
    }
}
