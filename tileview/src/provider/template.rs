//! URL-template tile providers.
//!
//! Covers every provider that addresses tiles by `{z}/{x}/{y}` in the URL:
//! OpenStreetMap (with or without subdomain rotation), Stamen Toner and
//! user-supplied templates.
//!
//! # Placeholders
//!
//! - `{z}`, `{x}`, `{y}` - tile index
//! - `{s}` - subdomain, chosen round-robin from the configured list
//!
//! Subdomain selection is an incrementing counter modulo the list length,
//! so the sequence of hosts is deterministic for a given call order.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::{validate_cache_name, ProviderError, TileProvider};
use crate::coord::TileIndex;

pub const OSM_TEMPLATE: &str = "http://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
pub const STAMEN_TONER_TEMPLATE: &str = "http://a.tile.stamen.com/toner/{z}/{x}/{y}.png";

/// Tile provider driven by a URL template.
pub struct TemplateProvider {
    name: String,
    cache_name: String,
    template: String,
    subdomains: Vec<String>,
    next_subdomain: AtomicUsize,
    max_zoom: u8,
}

impl TemplateProvider {
    /// Creates a provider from a URL template.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name, also used as the cache directory name
    /// * `template` - URL with `{z}`, `{x}`, `{y}` and optionally `{s}`
    /// * `subdomains` - Values substituted for `{s}`, in rotation order
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if the template lacks a tile
    /// placeholder, uses `{s}` with no subdomains, or the name is not a
    /// valid cache directory name.
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        subdomains: Vec<String>,
    ) -> Result<Self, ProviderError> {
        let name = name.into();
        let template = template.into();

        validate_cache_name(&name)?;
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(ProviderError::Configuration(format!(
                    "URL template for '{}' is missing {}",
                    name, placeholder
                )));
            }
        }
        if template.contains("{s}") && subdomains.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "URL template for '{}' uses {{s}} but no subdomains are configured",
                name
            )));
        }

        Ok(Self {
            cache_name: name.clone(),
            name,
            template,
            subdomains,
            next_subdomain: AtomicUsize::new(0),
            max_zoom: 19,
        })
    }

    /// OpenStreetMap rotating across the `a`, `b` and `c` hosts.
    pub fn osm() -> Self {
        Self {
            name: "osm".to_string(),
            cache_name: "osm".to_string(),
            template: OSM_TEMPLATE.to_string(),
            subdomains: OSM_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            next_subdomain: AtomicUsize::new(0),
            max_zoom: 19,
        }
    }

    /// OpenStreetMap pinned to one host, cached as `osm-<subdomain>`.
    pub fn osm_single(subdomain: &str) -> Result<Self, ProviderError> {
        if subdomain.is_empty() {
            return Err(ProviderError::Configuration(
                "OSM subdomain must not be empty".to_string(),
            ));
        }
        let name = format!("osm-{}", subdomain);
        let template = OSM_TEMPLATE.replace("{s}", subdomain);
        Self::new(name, template, Vec::new())
    }

    /// Stamen Toner black-and-white tiles.
    pub fn stamen_toner() -> Self {
        Self {
            name: "stamen-toner".to_string(),
            cache_name: "stamen-toner".to_string(),
            template: STAMEN_TONER_TEMPLATE.to_string(),
            subdomains: Vec::new(),
            next_subdomain: AtomicUsize::new(0),
            max_zoom: 18,
        }
    }

    /// Overrides the highest served zoom level.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Returns true if the provider spreads requests across subdomains.
    pub fn rotates_subdomains(&self) -> bool {
        self.subdomains.len() > 1 && self.template.contains("{s}")
    }

    fn next_subdomain(&self) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }
        let i = self.next_subdomain.fetch_add(1, Ordering::Relaxed);
        &self.subdomains[i % self.subdomains.len()]
    }
}

impl TileProvider for TemplateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn cache_name(&self) -> &str {
        &self.cache_name
    }

    fn tile_url(&self, tile: &TileIndex) -> Result<String, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let mut url = self
            .template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string());
        if url.contains("{s}") {
            url = url.replace("{s}", self.next_subdomain());
        }
        Ok(url)
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: u32, y: u32, zoom: u8) -> TileIndex {
        TileIndex::new(x, y, zoom).unwrap()
    }

    #[test]
    fn test_osm_rotates_subdomains_in_order() {
        let provider = TemplateProvider::osm();
        let t = tile(1, 2, 3);

        let hosts: Vec<String> = (0..4).map(|_| provider.tile_url(&t).unwrap()).collect();
        assert_eq!(hosts[0], "http://a.tile.openstreetmap.org/3/1/2.png");
        assert_eq!(hosts[1], "http://b.tile.openstreetmap.org/3/1/2.png");
        assert_eq!(hosts[2], "http://c.tile.openstreetmap.org/3/1/2.png");
        assert_eq!(hosts[3], "http://a.tile.openstreetmap.org/3/1/2.png");
        assert!(provider.rotates_subdomains());
    }

    #[test]
    fn test_osm_single_pins_host_and_cache_name() {
        let provider = TemplateProvider::osm_single("b").unwrap();
        assert_eq!(provider.cache_name(), "osm-b");
        assert!(!provider.rotates_subdomains());

        let url = provider.tile_url(&tile(5, 6, 7)).unwrap();
        assert_eq!(url, "http://b.tile.openstreetmap.org/7/5/6.png");
    }

    #[test]
    fn test_osm_single_rejects_empty_subdomain() {
        assert!(matches!(
            TemplateProvider::osm_single(""),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_stamen_toner_url() {
        let provider = TemplateProvider::stamen_toner();
        assert_eq!(provider.cache_name(), "stamen-toner");
        assert_eq!(
            provider.tile_url(&tile(10, 20, 5)).unwrap(),
            "http://a.tile.stamen.com/toner/5/10/20.png"
        );
    }

    #[test]
    fn test_custom_template_requires_placeholders() {
        let result = TemplateProvider::new("custom", "http://example.com/{z}/{x}.png", vec![]);
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_custom_template_requires_subdomains_for_s() {
        let result =
            TemplateProvider::new("custom", "http://{s}.example.com/{z}/{x}/{y}.png", vec![]);
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_custom_template_rejects_bad_name() {
        let result = TemplateProvider::new("../up", "http://example.com/{z}/{x}/{y}.png", vec![]);
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_unsupported_zoom() {
        let provider = TemplateProvider::stamen_toner();
        assert_eq!(
            provider.tile_url(&tile(0, 0, 20)),
            Err(ProviderError::UnsupportedZoom(20))
        );
    }

    #[test]
    fn test_with_max_zoom() {
        let provider = TemplateProvider::osm().with_max_zoom(22);
        assert!(provider.supports_zoom(22));
        assert!(!provider.supports_zoom(23));
    }
}
