//! Pluggable geodetic projection.
//!
//! Tile addressing needs exactly two things from a projection: mapping a
//! geographic point to absolute pixel coordinates at a zoom level, and the
//! world's pixel extent at that zoom. Everything else (tile sizes, wrapping,
//! axis flips) is a per-layer concern handled in [`crate::coord`].
//!
//! The default implementation is [`SphericalMercator`] (EPSG:3857), the
//! projection used by virtually all slippy-map tile servers. Callers with an
//! exotic CRS supply their own `Projection` behind an `Arc<dyn Projection>`.

use std::f64::consts::PI;

/// Web Mercator valid latitude range.
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Base pixel scale of the world at zoom 0.
///
/// The projected world spans `BASE_SCALE * 2^zoom` pixels per axis,
/// independent of any particular layer's tile size.
pub const BASE_SCALE: f64 = 256.0;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Absolute pixel coordinates in the projected world plane.
///
/// The origin is the north-west corner of the world; `x` increases eastward
/// and `y` increases southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Maps geographic coordinates to the projected pixel plane.
///
/// Implementations must be pure: the same input always projects to the same
/// output, with no I/O and no interior state.
pub trait Projection: Send + Sync {
    /// Project a geographic point to absolute pixel coordinates at `zoom`.
    fn project(&self, point: GeoPoint, zoom: u8) -> PixelPoint;

    /// The world's extent in pixels per axis at `zoom`.
    fn world_size(&self, zoom: u8) -> f64;
}

/// Spherical (Web) Mercator projection, EPSG:3857.
///
/// The formulas match the slippy-map convention: longitude maps linearly to
/// `x`, latitude maps through `asinh(tan(lat))` to `y`, with `y = 0` at the
/// north edge of the projected world.
#[derive(Debug, Default, Clone, Copy)]
pub struct SphericalMercator;

impl Projection for SphericalMercator {
    fn project(&self, point: GeoPoint, zoom: u8) -> PixelPoint {
        let size = self.world_size(zoom);

        let x = (point.lon + 180.0) / 360.0 * size;

        let lat_rad = point.lat * PI / 180.0;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * size;

        PixelPoint { x, y }
    }

    fn world_size(&self, zoom: u8) -> f64 {
        BASE_SCALE * 2.0_f64.powi(zoom as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_size_doubles_per_zoom() {
        let proj = SphericalMercator;
        assert_eq!(proj.world_size(0), 256.0);
        assert_eq!(proj.world_size(1), 512.0);
        assert_eq!(proj.world_size(10), 256.0 * 1024.0);
    }

    #[test]
    fn test_project_origin_is_world_center() {
        let proj = SphericalMercator;
        let p = proj.project(GeoPoint::new(0.0, 0.0), 2);

        // Equator / prime meridian lands at the exact center of the world.
        assert!((p.x - 512.0).abs() < 1e-9);
        assert!((p.y - 512.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_west_edge() {
        let proj = SphericalMercator;
        let p = proj.project(GeoPoint::new(0.0, -180.0), 3);
        assert!((p.x - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_north_is_smaller_y() {
        let proj = SphericalMercator;
        let north = proj.project(GeoPoint::new(45.0, 0.0), 5);
        let south = proj.project(GeoPoint::new(-45.0, 0.0), 5);
        assert!(north.y < south.y, "y must increase southward");
    }

    #[test]
    fn test_project_new_york_zoom_16() {
        // Matches the slippy-map reference: NYC at zoom 16 falls in
        // tile (col 19295, row 24640) with 256px tiles.
        let proj = SphericalMercator;
        let p = proj.project(GeoPoint::new(40.7128, -74.0060), 16);
        assert_eq!((p.x / 256.0).floor() as u32, 19295);
        assert_eq!((p.y / 256.0).floor() as u32, 24640);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_projected_point_in_world(
                lat in MIN_LAT..MAX_LAT,
                lon in MIN_LON..MAX_LON,
                zoom in 0u8..=18
            ) {
                let proj = SphericalMercator;
                let size = proj.world_size(zoom);
                let p = proj.project(GeoPoint::new(lat, lon), zoom);

                prop_assert!(p.x >= 0.0 && p.x <= size);
                prop_assert!(p.y >= 0.0 && p.y <= size);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in -60.0..60.0_f64,
                lon1 in -180.0..-1.0_f64,
                lon2 in 0.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let proj = SphericalMercator;
                let p1 = proj.project(GeoPoint::new(lat, lon1), zoom);
                let p2 = proj.project(GeoPoint::new(lat, lon2), zoom);
                prop_assert!(p1.x < p2.x);
            }
        }
    }
}
