//! Cache path layout.
//!
//! Tiles live at `<root>/<cache_name>/<zoom>/<x>/<y>.png`. The cache name is
//! the provider's [`cache_name`](crate::provider::TileProvider::cache_name),
//! which embeds any configuration that changes the imagery.

use std::path::{Path, PathBuf};

use crate::coord::TileIndex;

/// File extension of cached tiles.
pub const TILE_EXTENSION: &str = "png";

/// Directory holding the tiles of one column (`<root>/<name>/<zoom>/<x>`).
pub fn tile_directory(root: &Path, cache_name: &str, tile: &TileIndex) -> PathBuf {
    root.join(cache_name)
        .join(tile.zoom.to_string())
        .join(tile.x.to_string())
}

/// Full path of one cached tile.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use tileview::cache::tile_path;
/// use tileview::coord::TileIndex;
///
/// let tile = TileIndex::new(138717, 88904, 18).unwrap();
/// let path = tile_path(Path::new("/cache"), "osm", &tile);
/// assert_eq!(path, Path::new("/cache/osm/18/138717/88904.png"));
/// ```
pub fn tile_path(root: &Path, cache_name: &str, tile: &TileIndex) -> PathBuf {
    tile_directory(root, cache_name, tile).join(format!("{}.{}", tile.y, TILE_EXTENSION))
}
