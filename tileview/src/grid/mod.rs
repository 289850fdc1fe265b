//! Tile grids.
//!
//! [`plan_grid`] decides which tiles cover a viewport; [`TileSet`] is the
//! immutable result once each planned tile has been resolved to a cached
//! image or marked unavailable.

mod plan;
mod types;

pub use plan::{plan_grid, GridPlan};
pub use types::{PixelRect, Tile, TileBounds, TileImage, TileSet, TileSetId, Viewport};
