//! Crate-level error types.
//!
//! Tile-level fetch failures never escape grid assembly; they are recorded
//! as unavailable cells. The variants here are what callers of the public
//! API can actually observe.

use thiserror::Error;

use crate::coord::CoordError;
use crate::grid::TileSetId;
use crate::provider::ProviderError;

/// Errors returned by tile sources and view queues.
#[derive(Debug, Error)]
pub enum TileError {
    /// Bad coordinate, zoom or pixel input. No grid is produced.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoordError),

    /// A single tile could not be retrieved. Recoverable; the caller may retry.
    #[error("Failed to fetch tile: {0}")]
    FetchFailed(#[source] ProviderError),

    /// The source is misconfigured and cannot be used.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The referenced tile set was never produced by this source.
    #[error("Unknown tile set id {id} (source holds {count} tile sets)")]
    UnknownTileSet { id: TileSetId, count: usize },

    /// A pixel conversion was requested before any tile set became active.
    #[error("No active tile set")]
    NoActiveTileSet,

    /// Local storage failure in the tile cache.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for TileError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Configuration(msg) => TileError::Configuration(msg),
            other => TileError::FetchFailed(other),
        }
    }
}

impl TileError {
    /// Returns true for errors a caller can reasonably retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TileError::FetchFailed(_) | TileError::Io(_))
    }
}
