//! Tile addressing.
//!
//! Pure functions mapping a geographic rectangle at a zoom level onto the
//! discrete tile grid of a [`Layer`]: projecting corners to pixel bounds,
//! flooring to inclusive tile-index rectangles, counting covered tiles, and
//! normalizing individual coordinates (x-wrap, TMS flip, zoom offset) for
//! key and URL construction. No I/O happens here.
//!
//! The grid convention is the slippy-map one: `col` increases eastward,
//! `row` increases southward, and the north-west / south-east corner pair of
//! a rectangle spans its tile coverage. TMS layers flip rows afterwards via
//! [`adjust_coord`].

mod types;

pub use types::{AddressingError, GeoRect, PixelBounds, TileCoord, TileIndexRect};

use crate::layer::Layer;
use crate::projection::{GeoPoint, Projection};

/// Project a rectangle's defining corners to pixel bounds at `zoom`.
///
/// The north-west corner projects to the minimum pixel pair and the
/// south-east corner to the maximum, because projected `y` increases
/// southward.
pub fn to_pixel_bounds(rect: &GeoRect, zoom: u8, projection: &dyn Projection) -> PixelBounds {
    let nw = projection.project(GeoPoint::new(rect.north(), rect.west()), zoom);
    let se = projection.project(GeoPoint::new(rect.south(), rect.east()), zoom);

    PixelBounds {
        min_x: nw.x,
        min_y: nw.y,
        max_x: se.x,
        max_y: se.y,
    }
}

/// Convert a geographic rectangle to an inclusive tile-index rectangle.
///
/// Pixel bounds divided by the layer's tile size and floored. The zoom is
/// taken as given: callers filter against the layer's supported range, this
/// function does not clamp.
pub fn to_tile_index_bounds(
    rect: &GeoRect,
    zoom: u8,
    layer: &Layer,
    projection: &dyn Projection,
) -> TileIndexRect {
    let pixel_bounds = to_pixel_bounds(rect, zoom, projection);
    let tile_size = layer.tile_size() as f64;

    TileIndexRect {
        min_col: (pixel_bounds.min_x / tile_size).floor() as i32,
        min_row: (pixel_bounds.min_y / tile_size).floor() as i32,
        max_col: (pixel_bounds.max_x / tile_size).floor() as i32,
        max_row: (pixel_bounds.max_y / tile_size).floor() as i32,
    }
}

/// Count the tiles covering `rect` at `zoom`.
///
/// `(max_col - min_col + 1) * (max_row - min_row + 1)` over the index
/// bounds. Does not special-case a tile appearing more than once on screen
/// (screen pixel larger than a world pixel); that approximation is accepted
/// behavior.
pub fn count_tiles(rect: &GeoRect, zoom: u8, layer: &Layer, projection: &dyn Projection) -> u64 {
    let bounds = to_tile_index_bounds(rect, zoom, layer, projection);
    bounds.width() * bounds.height()
}

/// The world's extent in whole tiles at `zoom`, as `(columns, rows)`.
pub fn world_tile_extent(zoom: u8, layer: &Layer, projection: &dyn Projection) -> (i32, i32) {
    let tiles = (projection.world_size(zoom) / layer.tile_size() as f64).floor() as i32;
    (tiles, tiles)
}

/// Check whether a tile row lies inside the world.
///
/// Rows outside `[0, world_rows)` do not exist and are dropped by the
/// enumeration. Columns are never rejected here: x is cyclic (wrapped by
/// [`adjust_coord`]), not clipped.
pub fn is_within_world(coord: &TileCoord, layer: &Layer, projection: &dyn Projection) -> bool {
    let (_, rows) = world_tile_extent(coord.zoom, layer, projection);
    coord.row >= 0 && coord.row < rows
}

/// Normalize a raw enumeration coordinate for the layer's tile scheme.
///
/// Applies, in order: x-wrap (unless the layer disables wrapping), TMS row
/// flip, then the layer's zoom offset. `zoom` is the display zoom the
/// coordinate was enumerated at; the wrap extent is computed from it, and
/// the offset is added to it exactly once. Calling this again with the same
/// `zoom` yields the same result rather than compounding the offset.
///
/// Returns a new value; the input is never mutated.
pub fn adjust_coord(
    coord: TileCoord,
    zoom: u8,
    layer: &Layer,
    projection: &dyn Projection,
) -> TileCoord {
    let (cols, rows) = world_tile_extent(zoom, layer, projection);

    let mut col = coord.col;
    if !layer.no_wrap() && cols > 0 {
        col = ((col % cols) + cols) % cols;
    }

    let mut row = coord.row;
    if layer.tms() {
        row = rows - row - 1;
    }

    TileCoord {
        col,
        row,
        zoom: zoom.saturating_add_signed(layer.zoom_offset()),
    }
}
