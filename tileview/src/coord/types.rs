//! Coordinate type definitions

use serde::Serialize;
use thiserror::Error;

/// Web Mercator latitude bound. Latitudes beyond it are clamped before projection.
pub const MAX_LAT: f64 = 85.051_128_779_806_59;
pub const MIN_LAT: f64 = -MAX_LAT;

/// Highest supported zoom level.
///
/// Keeps `2^zoom` exactly representable as both `u32` tile indices and `f64`
/// fractional positions.
pub const MAX_ZOOM: u8 = 24;

/// Edge length of one square tile in pixels.
pub const TILE_SIZE_PX: u32 = 256;

/// A geographic position in degrees.
///
/// Longitude is not range-checked; latitude is clamped to
/// [`MIN_LAT`]..=[`MAX_LAT`] by the projection functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns true when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Address of one tile in the quad-tree tiling scheme.
///
/// `x` grows eastward from the antimeridian, `y` grows southward from the
/// north edge of the projection. Both lie in `[0, 2^zoom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileIndex {
    /// Creates a tile index, rejecting zoom levels above [`MAX_ZOOM`] and
    /// indices outside the grid for that zoom.
    pub fn new(x: u32, y: u32, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let size = Self::tiles_per_axis(zoom);
        if x >= size || y >= size {
            return Err(CoordError::TileOutOfRange { x, y, zoom, size });
        }
        Ok(Self { x, y, zoom })
    }

    /// Number of tiles along one axis at `zoom`.
    ///
    /// Callers must pass a zoom no greater than [`MAX_ZOOM`].
    #[inline]
    pub fn tiles_per_axis(zoom: u8) -> u32 {
        1u32 << zoom
    }

    /// Fractional tile position of this tile's center.
    #[inline]
    pub fn center_fraction(&self) -> (f64, f64) {
        (self.x as f64 + 0.5, self.y as f64 + 0.5)
    }
}

impl std::fmt::Display for TileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic rectangle in degrees.
///
/// `north >= south` for any box produced by this crate; `west <= east`
/// unless a caller passes longitudes that wrap the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl GeoBounds {
    /// Returns true if `coord` lies inside the box (edges included).
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.lon >= self.west
            && coord.lon <= self.east
            && coord.lat <= self.north
            && coord.lat >= self.south
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Longitude or latitude is NaN or infinite.
    #[error("Non-finite coordinate: lon={lon}, lat={lat}")]
    NonFiniteCoordinate { lon: f64, lat: f64 },

    /// Fractional tile or pixel position is NaN or infinite.
    #[error("Non-finite position: ({x}, {y})")]
    NonFinitePosition { x: f64, y: f64 },

    /// Zoom level is above the supported maximum.
    #[error("Invalid zoom level: {0} (must be between 0 and {max})", max = MAX_ZOOM)]
    InvalidZoom(u8),

    /// Tile index lies outside the grid for its zoom level.
    #[error("Tile ({x}, {y}) is outside the {size}x{size} grid at zoom {zoom}")]
    TileOutOfRange { x: u32, y: u32, zoom: u8, size: u32 },
}
