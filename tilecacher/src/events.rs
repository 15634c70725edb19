//! Progress and notification events.
//!
//! Consumers (a progress bar, a map view refreshing freshly cached tiles)
//! subscribe to a [`CacheEvent`] channel. The engine never blocks on a slow
//! consumer: events go over an unbounded sender and a dropped receiver
//! silently ends delivery without disturbing the job.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::coord::TileCoord;

/// Events emitted by a cache job and its fetch pipeline.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A job accepted its work queue; `total` is the expected tile count.
    Started { total: u64 },

    /// A tile resolved successfully, from the store (`cache_hit`) or from
    /// the origin. Carries the stored bytes for display consumers.
    TileCached {
        coord: TileCoord,
        data: Bytes,
        cache_hit: bool,
    },

    /// A tile was skipped after a fetch/store failure. The job continues.
    TileFailed { coord: TileCoord },

    /// Snapshot after each processed tile. `completed` counts hits, misses
    /// and failures alike and never decreases.
    Progress { completed: u64, total: u64 },

    /// The queue drained. Emitted exactly once, after the final progress
    /// snapshot.
    Completed { completed: u64, total: u64 },

    /// The job observed cancellation and stopped; no further events follow.
    Cancelled { completed: u64, total: u64 },
}

/// Sending half of an event subscription.
pub type EventSender = mpsc::UnboundedSender<CacheEvent>;

/// Receiving half of an event subscription.
pub type EventReceiver = mpsc::UnboundedReceiver<CacheEvent>;

/// Create an event channel pair.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event if anyone is listening.
pub(crate) fn emit(sender: Option<&EventSender>, event: CacheEvent) {
    if let Some(sender) = sender {
        let _ = sender.send(event);
    }
}
