//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude),
//! fractional Web Mercator tile positions and pixel offsets relative to a
//! tile grid's upper-left tile.
//!
//! All functions are pure. Latitude is clamped to ±[`MAX_LAT`] before the
//! Mercator logarithm, which keeps `sin(latitude)` well inside (-1, 1) so
//! the poles never produce infinities. No other input is silently adjusted:
//! non-finite values and zoom levels above [`MAX_ZOOM`] are rejected.

mod types;

pub use types::{
    Coordinate, CoordError, GeoBounds, TileIndex, MAX_LAT, MAX_ZOOM, MIN_LAT, TILE_SIZE_PX,
};

use std::f64::consts::PI;

/// Side length of the static-map world square, in world units.
const WORLD_UNITS: f64 = TILE_SIZE_PX as f64;

#[inline]
fn validate_zoom(zoom: u8) -> Result<f64, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(TileIndex::tiles_per_axis(zoom) as f64)
}

/// `sin(latitude)` with latitude clamped to the Mercator bound, used by
/// every forward transform. At ±[`MAX_LAT`] this is about ±0.9963.
#[inline]
fn clamped_sin_lat(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT).to_radians().sin()
}

/// Converts a geographic coordinate to a fractional tile position.
///
/// # Arguments
///
/// * `lon` - Longitude in degrees (unconstrained)
/// * `lat` - Latitude in degrees, clamped to ±[`MAX_LAT`]
/// * `zoom` - Zoom level (0 to [`MAX_ZOOM`])
///
/// # Returns
///
/// `(xf, yf)` where the integer parts address the containing tile and the
/// fractional parts locate the point inside it.
///
/// # Example
///
/// ```
/// use tileview::coord::to_tile_fraction;
///
/// let (x, y) = to_tile_fraction(0.0, 0.0, 0).unwrap();
/// assert_eq!((x, y), (0.5, 0.5));
/// ```
pub fn to_tile_fraction(lon: f64, lat: f64, zoom: u8) -> Result<(f64, f64), CoordError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(CoordError::NonFiniteCoordinate { lon, lat });
    }
    let n = validate_zoom(zoom)?;

    let sin_lat = clamped_sin_lat(lat);
    let xf = (lon + 180.0) / 360.0 * n;
    let yf = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * n;

    Ok((xf, yf))
}

/// Converts a fractional tile position back to a geographic coordinate.
///
/// Exact inverse of [`to_tile_fraction`] for latitudes inside the clamp.
pub fn to_coordinate(xf: f64, yf: f64, zoom: u8) -> Result<Coordinate, CoordError> {
    if !xf.is_finite() || !yf.is_finite() {
        return Err(CoordError::NonFinitePosition { x: xf, y: yf });
    }
    let n = validate_zoom(zoom)?;

    let lon = xf / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * yf / n)).sinh().atan().to_degrees();

    Ok(Coordinate { lon, lat })
}

/// Converts a pixel offset inside a grid to a geographic coordinate.
///
/// The offset is measured from the north-west corner of `upper_left`.
pub fn pixel_to_coordinate(
    pixel_x: f64,
    pixel_y: f64,
    zoom: u8,
    upper_left: TileIndex,
) -> Result<Coordinate, CoordError> {
    if !pixel_x.is_finite() || !pixel_y.is_finite() {
        return Err(CoordError::NonFinitePosition {
            x: pixel_x,
            y: pixel_y,
        });
    }
    let xf = upper_left.x as f64 + pixel_x / TILE_SIZE_PX as f64;
    let yf = upper_left.y as f64 + pixel_y / TILE_SIZE_PX as f64;
    to_coordinate(xf, yf, zoom)
}

/// Converts a geographic coordinate to a pixel offset inside a grid whose
/// north-west corner is the corner of `upper_left`.
///
/// Inverse of [`pixel_to_coordinate`]. Offsets may be negative or exceed the
/// grid when the coordinate lies outside it.
pub fn coordinate_to_pixel(
    lon: f64,
    lat: f64,
    zoom: u8,
    upper_left: TileIndex,
) -> Result<(f64, f64), CoordError> {
    let (xf, yf) = to_tile_fraction(lon, lat, zoom)?;
    let x = (xf - upper_left.x as f64) * TILE_SIZE_PX as f64;
    let y = (yf - upper_left.y as f64) * TILE_SIZE_PX as f64;
    Ok((x, y))
}

/// Returns the tile containing a coordinate.
///
/// Positions outside the world (longitudes beyond ±180°) are clamped onto
/// the nearest edge tile; wrapping is not performed.
pub fn containing_tile(lon: f64, lat: f64, zoom: u8) -> Result<TileIndex, CoordError> {
    let (xf, yf) = to_tile_fraction(lon, lat, zoom)?;
    let max = (TileIndex::tiles_per_axis(zoom) - 1) as f64;
    Ok(TileIndex {
        x: xf.floor().clamp(0.0, max) as u32,
        y: yf.floor().clamp(0.0, max) as u32,
        zoom,
    })
}

/// Geographic coordinate of a tile's center.
pub fn tile_center(tile: &TileIndex) -> Result<Coordinate, CoordError> {
    let (xf, yf) = tile.center_fraction();
    to_coordinate(xf, yf, tile.zoom)
}

/// Geographic box covered by a static map image centered on `center`.
///
/// Works in the 256-unit world square used by static-map services: the
/// center is projected into world units, the half image size (divided by
/// `2^zoom`) is added on each side, and the corners are projected back.
///
/// # Example
///
/// ```
/// use tileview::coord::{static_map_bounds, Coordinate};
///
/// let b = static_map_bounds(Coordinate::new(10.5, 50.0), 18, 256, 256).unwrap();
/// assert!(b.west < 10.5 && b.east > 10.5);
/// assert!(b.south < 50.0 && b.north > 50.0);
/// ```
pub fn static_map_bounds(
    center: Coordinate,
    zoom: u8,
    width_px: u32,
    height_px: u32,
) -> Result<GeoBounds, CoordError> {
    if !center.is_finite() {
        return Err(CoordError::NonFiniteCoordinate {
            lon: center.lon,
            lat: center.lat,
        });
    }
    let scale = validate_zoom(zoom)?;

    let origin = WORLD_UNITS / 2.0;
    let units_per_degree = WORLD_UNITS / 360.0;
    let units_per_radian = WORLD_UNITS / (2.0 * PI);

    let sin_lat = clamped_sin_lat(center.lat);
    let cx = origin + center.lon * units_per_degree;
    let cy = origin - 0.5 * units_per_radian * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln();

    let half_w = width_px as f64 / (2.0 * scale);
    let half_h = height_px as f64 / (2.0 * scale);

    let world_y_to_lat =
        |y: f64| (2.0 * ((origin - y) / units_per_radian).exp().atan() - PI / 2.0).to_degrees();

    Ok(GeoBounds {
        west: (cx - half_w - origin) / units_per_degree,
        north: world_y_to_lat(cy - half_h),
        east: (cx + half_w - origin) / units_per_degree,
        south: world_y_to_lat(cy + half_h),
    })
}
