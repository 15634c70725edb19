//! Tile layer descriptors.
//!
//! A [`Layer`] describes one logical tile source: where its tiles come from
//! (URL template, optional relay proxy), how its grid is addressed (tile
//! size, zoom range, zoom offset, TMS flip, world wrap), and the name of the
//! store partition its tiles persist into. One layer maps to exactly one
//! partition, so tiles from different layers never collide even when their
//! grid indices coincide.
//!
//! The name is a mandatory constructor argument. There is no default-name
//! counter; the owning application decides what a layer is called.

use crate::coord::TileCoord;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default zoom range for a layer that does not declare one.
pub const DEFAULT_MIN_ZOOM: u8 = 0;
pub const DEFAULT_MAX_ZOOM: u8 = 18;

/// Descriptor of one tile source and its store partition.
///
/// Immutable after construction; build with [`Layer::new`] plus the
/// `with_*` methods.
///
/// # Example
///
/// ```
/// use tilecacher::layer::Layer;
///
/// let layer = Layer::new("swisstopo", "https://tiles.example.ch/{z}/{x}/{y}.jpeg")
///     .with_zoom_range(8, 17)
///     .with_tms(true);
///
/// assert_eq!(layer.name(), "swisstopo");
/// assert!(layer.supports_zoom(12));
/// assert!(!layer.supports_zoom(18));
/// ```
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    url_template: String,
    tile_size: u32,
    min_zoom: u8,
    max_zoom: u8,
    zoom_offset: i8,
    tms: bool,
    no_wrap: bool,
    proxy: Option<String>,
    referrer: Option<String>,
    cross_origin: Option<String>,
}

impl Layer {
    /// Create a layer with the given partition name and URL template.
    ///
    /// The template addresses the origin server with `{z}`, `{x}` and `{y}`
    /// placeholders, e.g. `https://tile.example.org/{z}/{x}/{y}.png`.
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            tile_size: DEFAULT_TILE_SIZE,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_offset: 0,
            tms: false,
            no_wrap: false,
            proxy: None,
            referrer: None,
            cross_origin: None,
        }
    }

    /// Set the tile edge length in pixels.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the supported zoom range (inclusive).
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the constant added to the display zoom when addressing the
    /// origin's zoom numbering.
    pub fn with_zoom_offset(mut self, zoom_offset: i8) -> Self {
        self.zoom_offset = zoom_offset;
        self
    }

    /// Declare the origin as TMS (y axis increases northward, rows flip).
    pub fn with_tms(mut self, tms: bool) -> Self {
        self.tms = tms;
        self
    }

    /// Disable x-wrapping for a non-cyclic (continuous-world) layer.
    pub fn with_no_wrap(mut self, no_wrap: bool) -> Self {
        self.no_wrap = no_wrap;
        self
    }

    /// Route fetches through a relay endpoint (`proxy?img=…&ref=…`).
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Referrer value the relay forwards to the origin.
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    /// Credential mode for the image fetch.
    pub fn with_cross_origin(mut self, cross_origin: impl Into<String>) -> Self {
        self.cross_origin = Some(cross_origin.into());
        self
    }

    /// The store partition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn zoom_offset(&self) -> i8 {
        self.zoom_offset
    }

    pub fn tms(&self) -> bool {
        self.tms
    }

    pub fn no_wrap(&self) -> bool {
        self.no_wrap
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    pub fn cross_origin(&self) -> Option<&str> {
        self.cross_origin.as_deref()
    }

    /// Check if a display zoom falls inside the layer's supported range.
    pub fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }

    /// Expand the URL template for an (already adjusted) coordinate.
    pub fn tile_url(&self, coord: &TileCoord) -> String {
        self.url_template
            .replace("{z}", &coord.zoom.to_string())
            .replace("{x}", &coord.col.to_string())
            .replace("{y}", &coord.row.to_string())
    }
}
