//! Tile source configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::ProviderConfig;

/// Everything a [`TileSource`](super::TileSource) needs at construction.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tileview::provider::ProviderConfig;
/// use tileview::source::SourceConfig;
///
/// let config = SourceConfig::new("/tmp/tiles", ProviderConfig::osm())
///     .with_download_delay(Duration::from_millis(500));
/// assert_eq!(config.download_delay(), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Root directory of the tile cache, shared by every source.
    pub cache_dir: PathBuf,
    pub provider: ProviderConfig,
    /// Overrides the provider's default delay between downloads.
    pub download_delay: Option<Duration>,
}

impl SourceConfig {
    pub fn new(cache_dir: impl Into<PathBuf>, provider: ProviderConfig) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            provider,
            download_delay: None,
        }
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    /// Delay actually applied between downloads.
    pub fn download_delay(&self) -> Duration {
        self.download_delay
            .unwrap_or_else(|| self.provider.default_download_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GoogleMapType;

    #[test]
    fn test_default_delay_follows_provider() {
        let rotating = SourceConfig::new("/c", ProviderConfig::osm());
        assert_eq!(rotating.download_delay(), Duration::from_millis(330));

        let google = SourceConfig::new(
            "/c",
            ProviderConfig::google_static(GoogleMapType::Satellite, "k"),
        );
        assert_eq!(google.download_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_override_delay() {
        let config = SourceConfig::new("/c", ProviderConfig::stamen_toner())
            .with_download_delay(Duration::ZERO);
        assert_eq!(config.download_delay(), Duration::ZERO);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let config = SourceConfig::new(
            "/c",
            ProviderConfig::google_static(GoogleMapType::Roadmap, "hunter2"),
        );
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
