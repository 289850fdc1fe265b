//! Tile grid types

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::coord::{
    coordinate_to_pixel, pixel_to_coordinate, CoordError, Coordinate, GeoBounds, TileIndex,
    TILE_SIZE_PX,
};

/// Position of a tile set in its source's history. Assigned on append,
/// never reused.
pub type TileSetId = usize;

/// Viewport half-extents in pixels, measured from the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Viewport {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Viewport {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Same half-extent on every side.
    pub fn uniform(half: u32) -> Self {
        Self::new(half, half, half, half)
    }

    /// Viewport centered in a `width` x `height` pixel area.
    pub fn centered(width: u32, height: u32) -> Self {
        Self::new(width / 2, width - width / 2, height / 2, height - height / 2)
    }
}

/// Inclusive tile index rectangle at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub zoom: u8,
}

impl TileBounds {
    pub fn columns(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn tile_count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn contains(&self, tile: &TileIndex) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// North-west tile of the rectangle.
    pub fn upper_left(&self) -> TileIndex {
        TileIndex {
            x: self.min_x,
            y: self.min_y,
            zoom: self.zoom,
        }
    }

    /// Tile indices in row-major order: north to south, west to east
    /// within a row.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| {
            (self.min_x..=self.max_x).map(move |x| TileIndex {
                x,
                y,
                zoom: self.zoom,
            })
        })
    }
}

/// Pixel rectangle inside a grid, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Where a tile's image can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TileImage {
    /// Image is on disk in the tile cache.
    Cached { path: PathBuf },
    /// Image could not be retrieved. Renderers draw a placeholder.
    Unavailable,
}

/// One cell of a tile set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    index: TileIndex,
    source: String,
    offset_px: (u32, u32),
    image: TileImage,
}

impl Tile {
    pub(crate) fn new(index: TileIndex, source: String, offset_px: (u32, u32), image: TileImage) -> Self {
        Self {
            index,
            source,
            offset_px,
            image,
        }
    }

    pub fn index(&self) -> TileIndex {
        self.index
    }

    /// Cache name of the provider the tile came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Offset of the tile's north-west corner from the grid origin.
    pub fn offset_px(&self) -> (u32, u32) {
        self.offset_px
    }

    pub fn size_px(&self) -> (u32, u32) {
        (TILE_SIZE_PX, TILE_SIZE_PX)
    }

    /// Pixel area the tile occupies in the grid.
    pub fn pixel_bounds(&self) -> PixelRect {
        let (x, y) = self.offset_px;
        PixelRect {
            left: x,
            top: y,
            right: x + TILE_SIZE_PX,
            bottom: y + TILE_SIZE_PX,
        }
    }

    pub fn image(&self) -> &TileImage {
        &self.image
    }

    /// Cached file path, or `None` for an unavailable tile.
    pub fn path(&self) -> Option<&Path> {
        match &self.image {
            TileImage::Cached { path } => Some(path),
            TileImage::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.image, TileImage::Cached { .. })
    }
}

/// Immutable snapshot of the tiles covering one viewport.
///
/// Every cell of `rows` holds a [`Tile`]; tiles that could not be fetched
/// are marked [`TileImage::Unavailable`] rather than left out. Rows run
/// north to south and each row runs west to east, so `rows[0][0]` is the
/// upper-left tile used as the pixel anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSet {
    pub(crate) id: TileSetId,
    center: Coordinate,
    zoom: u8,
    viewport: Viewport,
    center_fraction: (f64, f64),
    tile_bounds: TileBounds,
    geo_bounds: GeoBounds,
    rows: Vec<Vec<Tile>>,
}

impl TileSet {
    /// Assembles a tile set from a plan and the resolved image of each tile.
    ///
    /// `resolve` is called once per tile in row-major order.
    pub(crate) fn assemble(
        plan: super::GridPlan,
        source: &str,
        mut resolve: impl FnMut(&TileIndex) -> TileImage,
    ) -> Self {
        let bounds = plan.tile_bounds;
        let rows = (bounds.min_y..=bounds.max_y)
            .map(|y| {
                (bounds.min_x..=bounds.max_x)
                    .map(|x| {
                        let index = TileIndex {
                            x,
                            y,
                            zoom: bounds.zoom,
                        };
                        let offset = (
                            (x - bounds.min_x) * TILE_SIZE_PX,
                            (y - bounds.min_y) * TILE_SIZE_PX,
                        );
                        let image = resolve(&index);
                        Tile::new(index, source.to_string(), offset, image)
                    })
                    .collect()
            })
            .collect();

        Self {
            id: 0,
            center: plan.center,
            zoom: plan.zoom,
            viewport: plan.viewport,
            center_fraction: plan.center_fraction,
            tile_bounds: bounds,
            geo_bounds: plan.geo_bounds,
            rows,
        }
    }

    pub fn id(&self) -> TileSetId {
        self.id
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tile_bounds(&self) -> TileBounds {
        self.tile_bounds
    }

    pub fn geo_bounds(&self) -> GeoBounds {
        self.geo_bounds
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn tile_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn available_count(&self) -> usize {
        self.tiles().filter(|t| t.is_available()).count()
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.rows.iter().flatten()
    }

    /// The north-west tile; the origin of the grid's pixel space.
    pub fn upper_left(&self) -> &Tile {
        &self.rows[0][0]
    }

    /// Looks up a tile by index.
    pub fn tile(&self, index: &TileIndex) -> Option<&Tile> {
        if !self.tile_bounds.contains(index) {
            return None;
        }
        let row = (index.y - self.tile_bounds.min_y) as usize;
        let col = (index.x - self.tile_bounds.min_x) as usize;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Total pixel size of the grid.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.tile_bounds.columns() * TILE_SIZE_PX,
            self.tile_bounds.rows() * TILE_SIZE_PX,
        )
    }

    /// Pixel position of the requested center inside the grid.
    pub fn anchor_px(&self) -> (f64, f64) {
        let tile = TILE_SIZE_PX as f64;
        (
            (self.center_fraction.0 - self.tile_bounds.min_x as f64) * tile,
            (self.center_fraction.1 - self.tile_bounds.min_y as f64) * tile,
        )
    }

    /// Geographic coordinate of a pixel in the grid's pixel space.
    pub fn pixel_to_coordinate(&self, pixel_x: f64, pixel_y: f64) -> Result<Coordinate, CoordError> {
        pixel_to_coordinate(pixel_x, pixel_y, self.zoom, self.tile_bounds.upper_left())
    }

    /// Pixel position of a coordinate in the grid's pixel space.
    pub fn coordinate_to_pixel(&self, lon: f64, lat: f64) -> Result<(f64, f64), CoordError> {
        coordinate_to_pixel(lon, lat, self.zoom, self.tile_bounds.upper_left())
    }
}
