//! Tile key scheme.

use std::fmt;

use crate::coord::TileCoord;

/// Primary key of a stored tile within its partition.
///
/// Formatted `"{z},{y},{x}"` from a coordinate that has already been
/// through [`crate::coord::adjust_coord`]: wrap, TMS flip and zoom offset
/// are baked in, so two coordinates the tile scheme considers equivalent
/// always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey(String);

impl TileKey {
    /// Derive the key for an adjusted coordinate.
    pub fn from_coord(coord: &TileCoord) -> Self {
        Self(format!("{},{},{}", coord.zoom, coord.row, coord.col))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&TileCoord> for TileKey {
    fn from(coord: &TileCoord) -> Self {
        Self::from_coord(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format_is_z_y_x() {
        let key = TileKey::from_coord(&TileCoord::new(3, 1, 16));
        assert_eq!(key.as_str(), "16,1,3");
    }

    #[test]
    fn test_equal_coords_equal_keys() {
        let a = TileKey::from_coord(&TileCoord::new(5, 12, 7));
        let b = TileKey::from_coord(&TileCoord::new(5, 12, 7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_axes_distinct_keys() {
        // col/row transposed must not collide.
        let a = TileKey::from_coord(&TileCoord::new(5, 12, 7));
        let b = TileKey::from_coord(&TileCoord::new(12, 5, 7));
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_matches_as_str() {
        let key = TileKey::from_coord(&TileCoord::new(0, 0, 0));
        assert_eq!(format!("{}", key), key.as_str());
    }
}
