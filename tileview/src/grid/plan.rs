//! Grid planning: which tiles cover a viewport.
//!
//! Planning is pure. It projects the viewport center, works out how many
//! extra tiles are needed on each side so that the requested pixel extents
//! are covered, clamps the result to the world and derives the geographic
//! bounds. Fetching the planned tiles is the tile source's job.

use serde::Serialize;

use super::types::{TileBounds, Viewport};
use crate::coord::{to_coordinate, to_tile_fraction, CoordError, Coordinate, GeoBounds, TileIndex, TILE_SIZE_PX};

/// The tiles covering one viewport, before any of them are fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPlan {
    pub center: Coordinate,
    pub zoom: u8,
    pub viewport: Viewport,
    /// Fractional tile position of the center.
    pub center_fraction: (f64, f64),
    pub tile_bounds: TileBounds,
    pub geo_bounds: GeoBounds,
}

/// Extra tiles needed beyond the center tile on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Margins {
    pub north: i64,
    pub east: i64,
    pub south: i64,
    pub west: i64,
}

/// Tiles needed on each side of the base tile so that the viewport's
/// half-extents are covered, given the center's offset inside the base tile.
///
/// `remainder` is the fractional part of the center's tile position, each
/// component in `[0, 1)`. Margins never go below zero: the center tile is
/// always part of the grid.
pub(crate) fn margins(viewport: &Viewport, remainder: (f64, f64)) -> Margins {
    let tile = TILE_SIZE_PX as f64;
    let (rx, ry) = remainder;
    let side = |v: f64| v.ceil().max(0.0) as i64;

    Margins {
        north: side(viewport.top as f64 / tile - ry),
        east: side(viewport.right as f64 / tile - (1.0 - rx)),
        south: side(viewport.bottom as f64 / tile - (1.0 - ry)),
        west: side(viewport.left as f64 / tile - rx),
    }
}

/// Plans the grid for a viewport centered on `center`.
///
/// # Errors
///
/// Fails for non-finite coordinates and zoom levels above the maximum.
///
/// # Example
///
/// ```
/// use tileview::coord::Coordinate;
/// use tileview::grid::{plan_grid, Viewport};
///
/// let plan = plan_grid(Coordinate::new(10.5, 50.0), 18, Viewport::uniform(128)).unwrap();
/// assert_eq!(plan.tile_bounds.columns(), 2);
/// assert_eq!(plan.tile_bounds.rows(), 2);
/// ```
pub fn plan_grid(center: Coordinate, zoom: u8, viewport: Viewport) -> Result<GridPlan, CoordError> {
    let (xf, yf) = to_tile_fraction(center.lon, center.lat, zoom)?;

    let base_x = xf.floor();
    let base_y = yf.floor();
    let m = margins(&viewport, (xf - base_x, yf - base_y));

    let last = TileIndex::tiles_per_axis(zoom) as i64 - 1;
    let clamp = |v: i64| v.clamp(0, last) as u32;
    let (bx, by) = (base_x as i64, base_y as i64);

    let tile_bounds = TileBounds {
        min_x: clamp(bx - m.west),
        min_y: clamp(by - m.north),
        max_x: clamp(bx + m.east),
        max_y: clamp(by + m.south),
        zoom,
    };

    // Tile N spans [N, N+1), so the far corner is max + 1.
    let north_west = to_coordinate(tile_bounds.min_x as f64, tile_bounds.min_y as f64, zoom)?;
    let south_east = to_coordinate(
        tile_bounds.max_x as f64 + 1.0,
        tile_bounds.max_y as f64 + 1.0,
        zoom,
    )?;

    Ok(GridPlan {
        center,
        zoom,
        viewport,
        center_fraction: (xf, yf),
        tile_bounds,
        geo_bounds: GeoBounds {
            west: north_west.lon,
            north: north_west.lat,
            east: south_east.lon,
            south: south_east.lat,
        },
    })
}
