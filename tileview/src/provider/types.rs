//! Core types for tile providers

use std::time::Duration;

use crate::coord::{TileIndex, MAX_ZOOM};

/// Minimum delay between downloads for single-host providers.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_secs(1);

/// Minimum delay for providers that spread requests across subdomains.
pub const ROTATING_DOWNLOAD_DELAY: Duration = Duration::from_millis(330);

/// Errors that can occur while building tile URLs or downloading tiles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The server answered successfully but the body is unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Requested zoom is outside what the provider serves.
    #[error("Unsupported zoom level: {0}")]
    UnsupportedZoom(u8),

    /// Provider cannot be used as configured.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A remote source of 256x256 map tiles.
///
/// Implementations only know how to address tiles; downloading, rate
/// limiting and caching are layered on top by the fetcher and cache.
/// Implementations must be safe to share between background assemblies.
pub trait TileProvider: Send + Sync {
    /// Human-readable provider name used in log fields.
    fn name(&self) -> &str;

    /// Directory name for this provider's tiles in the cache.
    ///
    /// Must be filesystem-safe and must differ between configurations that
    /// serve different imagery (for example, Google map types).
    fn cache_name(&self) -> &str;

    /// Builds the download URL for `tile`.
    ///
    /// URLs may embed credentials and must not be logged.
    fn tile_url(&self, tile: &TileIndex) -> Result<String, ProviderError>;

    /// Highest zoom level the provider serves.
    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }

    /// Returns true if the provider serves tiles at `zoom`.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom <= self.max_zoom()
    }
}

/// Checks that a cache name is a single, non-empty path component.
pub(crate) fn validate_cache_name(name: &str) -> Result<(), ProviderError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ProviderError::Configuration(format!(
            "Invalid cache name '{}': use letters, digits, '-', '_' or '.'",
            name
        )))
    }
}
