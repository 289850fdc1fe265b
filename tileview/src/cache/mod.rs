//! Persistent tile cache.
//!
//! Tiles are keyed by provider cache name, zoom and tile index and stored as
//! individual files. The cache is append-only: nothing here deletes or
//! replaces an entry once written, and there is no eviction.

mod disk;
mod path;

pub use disk::DiskTileCache;
pub use path::{tile_directory, tile_path, TILE_EXTENSION};
