//! Google Static Maps provider.
//!
//! Google's Static Maps API renders an image around a center coordinate
//! rather than serving XYZ tiles. Each tile is requested as a 256x256 image
//! centered on the tile's center, which at the same zoom covers exactly the
//! tile's footprint.
//!
//! Requires a Maps Platform API key with the Static Maps API enabled.

use std::fmt;
use std::str::FromStr;

use super::types::{ProviderError, TileProvider};
use crate::coord::{tile_center, TileIndex, TILE_SIZE_PX};

const STATIC_MAPS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Google static map imagery variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleMapType {
    Roadmap,
    Satellite,
    Hybrid,
    Terrain,
}

impl GoogleMapType {
    pub const ALL: [GoogleMapType; 4] = [
        GoogleMapType::Roadmap,
        GoogleMapType::Satellite,
        GoogleMapType::Hybrid,
        GoogleMapType::Terrain,
    ];

    /// Value used for the `maptype` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoogleMapType::Roadmap => "roadmap",
            GoogleMapType::Satellite => "satellite",
            GoogleMapType::Hybrid => "hybrid",
            GoogleMapType::Terrain => "terrain",
        }
    }
}

impl fmt::Display for GoogleMapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoogleMapType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roadmap" => Ok(GoogleMapType::Roadmap),
            "satellite" => Ok(GoogleMapType::Satellite),
            "hybrid" => Ok(GoogleMapType::Hybrid),
            "terrain" => Ok(GoogleMapType::Terrain),
            other => Err(ProviderError::Configuration(format!(
                "Unknown Google map type '{}' (expected roadmap, satellite, hybrid or terrain)",
                other
            ))),
        }
    }
}

/// Google Static Maps tile provider.
///
/// The cache name embeds the map type (`google-satellite`, ...) so tiles of
/// different types never share a cache entry.
///
/// # Example
///
/// ```
/// use tileview::provider::{GoogleMapType, GoogleStaticProvider, TileProvider};
///
/// let provider = GoogleStaticProvider::new(GoogleMapType::Hybrid, "KEY".to_string()).unwrap();
/// assert_eq!(provider.cache_name(), "google-hybrid");
/// ```
pub struct GoogleStaticProvider {
    map_type: GoogleMapType,
    api_key: String,
    cache_name: String,
}

impl GoogleStaticProvider {
    /// Creates a provider for `map_type`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `api_key` is empty.
    pub fn new(map_type: GoogleMapType, api_key: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Google static maps require an API key".to_string(),
            ));
        }
        Ok(Self {
            map_type,
            api_key,
            cache_name: format!("google-{}", map_type),
        })
    }

    pub fn map_type(&self) -> GoogleMapType {
        self.map_type
    }
}

impl TileProvider for GoogleStaticProvider {
    fn name(&self) -> &str {
        "Google Static Maps"
    }

    fn cache_name(&self) -> &str {
        &self.cache_name
    }

    fn tile_url(&self, tile: &TileIndex) -> Result<String, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }
        let center = tile_center(tile).map_err(|e| ProviderError::Configuration(e.to_string()))?;
        Ok(format!(
            "{}?center={},{}&zoom={}&maptype={}&size={}x{}&key={}",
            STATIC_MAPS_ENDPOINT,
            center.lat,
            center.lon,
            tile.zoom,
            self.map_type,
            TILE_SIZE_PX,
            TILE_SIZE_PX,
            self.api_key
        ))
    }

    fn max_zoom(&self) -> u8 {
        21
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_type_parsing() {
        assert_eq!("roadmap".parse::<GoogleMapType>().unwrap(), GoogleMapType::Roadmap);
        assert_eq!("Satellite".parse::<GoogleMapType>().unwrap(), GoogleMapType::Satellite);
        assert_eq!("hybrid".parse::<GoogleMapType>().unwrap(), GoogleMapType::Hybrid);
        assert_eq!("TERRAIN".parse::<GoogleMapType>().unwrap(), GoogleMapType::Terrain);
    }

    #[test]
    fn test_unknown_map_type_is_configuration_error() {
        let err = "moon".parse::<GoogleMapType>().unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            GoogleStaticProvider::new(GoogleMapType::Roadmap, String::new()),
            Err(ProviderError::Configuration(_))
        ));
        assert!(matches!(
            GoogleStaticProvider::new(GoogleMapType::Roadmap, "   ".to_string()),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_cache_name_embeds_map_type() {
        for map_type in GoogleMapType::ALL {
            let provider = GoogleStaticProvider::new(map_type, "k".to_string()).unwrap();
            assert_eq!(provider.cache_name(), format!("google-{}", map_type.as_str()));
        }
    }

    #[test]
    fn test_url_centers_on_tile() {
        let provider =
            GoogleStaticProvider::new(GoogleMapType::Satellite, "secret_key_123".to_string())
                .unwrap();
        // Zoom 1, tile (1, 0): center at lon 90, lat in the northern hemisphere.
        let url = provider.tile_url(&TileIndex::new(1, 0, 1).unwrap()).unwrap();

        assert!(url.starts_with("https://maps.googleapis.com/maps/api/staticmap?center="));
        assert!(url.contains(",90&zoom=1&"));
        assert!(url.contains("maptype=satellite"));
        assert!(url.contains("size=256x256"));
        assert!(url.ends_with("key=secret_key_123"));
    }

    #[test]
    fn test_unsupported_zoom() {
        let provider = GoogleStaticProvider::new(GoogleMapType::Roadmap, "k".to_string()).unwrap();
        assert_eq!(
            provider.tile_url(&TileIndex::new(0, 0, 22).unwrap()),
            Err(ProviderError::UnsupportedZoom(22))
        );
    }
}
