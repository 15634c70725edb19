//! Layers configuration file.
//!
//! The owning application describes its tile sources in a JSON document:
//! a map of layer name → options plus store-wide settings. The map key is
//! the layer's mandatory name and store partition; the option keys are the
//! ones tile-layer configs conventionally use (`urlTemplate`, `tileSize`,
//! `minZoom`, `maxZoom`, `zoomOffset`, `tms`, `noWrap`/`continuousWorld`,
//! `proxy`, `referrer`, `crossOrigin`).
//!
//! ```json
//! {
//!   "storeVersion": 1,
//!   "paceMs": 100,
//!   "layers": {
//!     "pixelkarte": {
//!       "urlTemplate": "https://wmts.example.ch/{z}/{x}/{y}.jpeg",
//!       "minZoom": 8,
//!       "maxZoom": 17,
//!       "proxy": "https://relay.example.org/imageProxy",
//!       "referrer": "https://map.example.org"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::layer::{Layer, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_TILE_SIZE};
use crate::queue::QueueConfig;

/// Errors from loading a layers configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A requested layer is not present in the file.
    #[error("layer not configured: {0}")]
    UnknownLayer(String),
}

fn default_store_version() -> u32 {
    1
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_min_zoom() -> u8 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> u8 {
    DEFAULT_MAX_ZOOM
}

/// Per-layer options as they appear in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerOptions {
    pub url_template: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default)]
    pub zoom_offset: i8,
    #[serde(default)]
    pub tms: bool,
    /// Disable x-wrapping. `continuousWorld` is the older spelling; either
    /// flag turns wrapping off.
    #[serde(default)]
    pub no_wrap: bool,
    #[serde(default)]
    pub continuous_world: bool,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub cross_origin: Option<String>,
}

impl LayerOptions {
    fn to_layer(&self, name: &str) -> Layer {
        let mut layer = Layer::new(name, &self.url_template)
            .with_tile_size(self.tile_size)
            .with_zoom_range(self.min_zoom, self.max_zoom)
            .with_zoom_offset(self.zoom_offset)
            .with_tms(self.tms)
            .with_no_wrap(self.no_wrap || self.continuous_world);

        if let Some(proxy) = &self.proxy {
            layer = layer.with_proxy(proxy);
        }
        if let Some(referrer) = &self.referrer {
            layer = layer.with_referrer(referrer);
        }
        if let Some(cross_origin) = &self.cross_origin {
            layer = layer.with_cross_origin(cross_origin);
        }

        layer
    }
}

/// The full layers configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayersConfig {
    /// Schema version the store is opened at.
    #[serde(default = "default_store_version")]
    pub store_version: u32,

    /// Pacing interval between network fetches, milliseconds.
    #[serde(default)]
    pub pace_ms: Option<u64>,

    layers: BTreeMap<String, LayerOptions>,
}

impl LayersConfig {
    /// Parse a configuration document from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Names of all configured layers, in file (sorted) order.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    /// Build the [`Layer`] configured under `name`.
    pub fn layer(&self, name: &str) -> Result<Layer, ConfigError> {
        self.layers
            .get(name)
            .map(|options| options.to_layer(name))
            .ok_or_else(|| ConfigError::UnknownLayer(name.to_string()))
    }

    /// Build every configured layer.
    pub fn all_layers(&self) -> Vec<Layer> {
        self.layers
            .iter()
            .map(|(name, options)| options.to_layer(name))
            .collect()
    }

    /// Queue tuning derived from the file (defaults where unset).
    pub fn queue_config(&self) -> QueueConfig {
        let mut config = QueueConfig::default();
        if let Some(pace_ms) = self.pace_ms {
            config.pace_interval = Duration::from_millis(pace_ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::DEFAULT_PACE_INTERVAL;

    const SAMPLE: &str = r#"{
        "storeVersion": 2,
        "paceMs": 250,
        "layers": {
            "pixelkarte": {
                "urlTemplate": "https://wmts.example.ch/{z}/{x}/{y}.jpeg",
                "minZoom": 8,
                "maxZoom": 17,
                "tms": true,
                "proxy": "https://relay.example.org/imageProxy",
                "referrer": "https://map.example.org"
            },
            "osm": {
                "urlTemplate": "https://tile.example.org/{z}/{x}/{y}.png"
            }
        }
    }"#;

    #[test]
    fn test_parse_full_document() {
        let config = LayersConfig::from_json(SAMPLE).unwrap();

        assert_eq!(config.store_version, 2);
        assert_eq!(config.layer_names(), vec!["osm", "pixelkarte"]);

        let layer = config.layer("pixelkarte").unwrap();
        assert_eq!(layer.name(), "pixelkarte");
        assert_eq!(layer.min_zoom(), 8);
        assert_eq!(layer.max_zoom(), 17);
        assert!(layer.tms());
        assert_eq!(layer.proxy(), Some("https://relay.example.org/imageProxy"));
        assert_eq!(layer.referrer(), Some("https://map.example.org"));
    }

    #[test]
    fn test_option_defaults() {
        let config = LayersConfig::from_json(SAMPLE).unwrap();
        let layer = config.layer("osm").unwrap();

        assert_eq!(layer.tile_size(), DEFAULT_TILE_SIZE);
        assert_eq!(layer.min_zoom(), DEFAULT_MIN_ZOOM);
        assert_eq!(layer.max_zoom(), DEFAULT_MAX_ZOOM);
        assert_eq!(layer.zoom_offset(), 0);
        assert!(!layer.tms());
        assert!(!layer.no_wrap());
        assert!(layer.proxy().is_none());
    }

    #[test]
    fn test_store_version_defaults_to_one() {
        let config = LayersConfig::from_json(r#"{"layers": {}}"#).unwrap();
        assert_eq!(config.store_version, 1);
        assert_eq!(config.queue_config().pace_interval, DEFAULT_PACE_INTERVAL);
    }

    #[test]
    fn test_continuous_world_disables_wrap() {
        let config = LayersConfig::from_json(
            r#"{"layers": {"polar": {
                "urlTemplate": "https://t.example.org/{z}/{x}/{y}",
                "continuousWorld": true
            }}}"#,
        )
        .unwrap();

        assert!(config.layer("polar").unwrap().no_wrap());
    }

    #[test]
    fn test_pace_ms_feeds_queue_config() {
        let config = LayersConfig::from_json(SAMPLE).unwrap();
        assert_eq!(
            config.queue_config().pace_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_unknown_layer_errors() {
        let config = LayersConfig::from_json(SAMPLE).unwrap();
        assert!(matches!(
            config.layer("missing"),
            Err(ConfigError::UnknownLayer(_))
        ));
    }

    #[test]
    fn test_unknown_option_key_is_rejected() {
        let result = LayersConfig::from_json(
            r#"{"layers": {"bad": {
                "urlTemplate": "https://t.example.org/{z}/{x}/{y}",
                "cacheOnly": true
            }}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = LayersConfig::load("/nonexistent/layers.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
