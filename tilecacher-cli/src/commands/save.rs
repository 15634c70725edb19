//! `save` command: cache a region's tiles for offline use.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tilecacher::coord::GeoRect;
use tilecacher::events::{channel, CacheEvent};
use tilecacher::origin::{HttpTileOrigin, ReqwestClient};
use tilecacher::pipeline::TilePipeline;
use tilecacher::projection::SphericalMercator;
use tilecacher::queue::{CacheJob, JobSummary};
use tilecacher::store::{DiskTileStore, TileStore};
use tilecacher::LayersConfig;

use crate::error::CliError;

/// Arguments for the `save` command.
#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Path to the layers configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub layers: PathBuf,

    /// Name of the configured layer to cache
    #[arg(long, value_name = "NAME")]
    pub layer: String,

    /// Region to cache, as south,west,north,east in degrees
    #[arg(long, value_name = "S,W,N,E")]
    pub bounds: String,

    /// Zoom level to cache; repeat for multiple levels
    #[arg(long = "zoom", value_name = "LEVEL", required = true)]
    pub zooms: Vec<u8>,

    /// Tile store directory (defaults to the platform data directory)
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Override the pause between network fetches, in milliseconds
    #[arg(long, value_name = "MS")]
    pub pace_ms: Option<u64>,
}

/// Parse `S,W,N,E` degrees into a validated rectangle.
fn parse_bounds(input: &str) -> Result<GeoRect, CliError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(CliError::InvalidBounds(format!(
            "expected 4 values, got {}",
            parts.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| CliError::InvalidBounds(format!("not a number: '{}'", part)))?;
    }

    Ok(GeoRect::new(values[0], values[1], values[2], values[3])?)
}

/// Default store location under the platform data directory.
fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilecacher")
        .join("tiles")
}

/// Run the save command to completion (or cancellation via Ctrl-C).
pub async fn run(args: SaveArgs) -> Result<(), CliError> {
    let rect = parse_bounds(&args.bounds)?;

    let config = LayersConfig::load(&args.layers)?;
    let layer = Arc::new(config.layer(&args.layer)?);

    let mut queue_config = config.queue_config();
    if let Some(pace_ms) = args.pace_ms {
        queue_config.pace_interval = std::time::Duration::from_millis(pace_ms);
    }

    let store_dir = args.store_dir.unwrap_or_else(default_store_dir);
    info!(store = %store_dir.display(), layer = layer.name(), "opening tile store");
    let store: Arc<dyn TileStore> = Arc::new(
        DiskTileStore::open(store_dir, config.store_version, &config.layer_names()).await?,
    );

    let client = Arc::new(ReqwestClient::new()?);
    let origin = Arc::new(HttpTileOrigin::new(Arc::clone(&layer), client));

    let (tx, mut rx) = channel();
    let pipeline = Arc::new(TilePipeline::new(
        layer,
        Arc::new(SphericalMercator),
        store,
        origin,
    ));
    let job = CacheJob::new(pipeline, &rect, &args.zooms, queue_config).with_events(tx);
    let handle = job.handle();

    // First Ctrl-C cancels cooperatively; the tile in flight finishes.
    let cancel_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling after current tile…");
            cancel_handle.cancel();
        }
    });

    let runner = tokio::spawn(job.run());

    let mut bar: Option<ProgressBar> = None;
    while let Some(event) = rx.recv().await {
        match event {
            CacheEvent::Started { total } => {
                println!("caching {} tiles", total);
                let pb = ProgressBar::new(total);
                pb.set_style(ProgressStyle::default_bar());
                bar = Some(pb);
            }
            CacheEvent::Progress { completed, .. } => {
                if let Some(pb) = &bar {
                    pb.set_position(completed);
                }
            }
            CacheEvent::TileFailed { coord } => {
                if let Some(pb) = &bar {
                    pb.println(format!("tile {} skipped", coord));
                }
            }
            CacheEvent::TileCached { .. } => {}
            CacheEvent::Completed { .. } => {
                if let Some(pb) = &bar {
                    pb.finish();
                }
            }
            CacheEvent::Cancelled { completed, total } => {
                if let Some(pb) = &bar {
                    pb.abandon();
                }
                println!("cancelled at {}/{} tiles", completed, total);
            }
        }
    }

    let summary: JobSummary = runner
        .await
        .map_err(|e| CliError::Runtime(format!("cache job panicked: {}", e)))?;

    println!(
        "{} tiles processed: {} already cached, {} fetched, {} failed",
        summary.completed, summary.hits, summary.fetched, summary.failed
    );

    Ok(())
}
