//! Provider configuration and construction.
//!
//! [`ProviderConfig`] is the programmatic description of a tile source's
//! remote endpoint. [`ProviderConfig::build`] validates it and produces the
//! concrete provider, so configuration mistakes surface at construction
//! time rather than on the first download.

use std::fmt;
use std::time::Duration;

use super::google::{GoogleMapType, GoogleStaticProvider};
use super::template::TemplateProvider;
use super::types::{ProviderError, TileProvider, DEFAULT_DOWNLOAD_DELAY, ROTATING_DOWNLOAD_DELAY};

/// Tile provider selection.
#[derive(Clone, PartialEq)]
pub enum ProviderConfig {
    /// OpenStreetMap, rotating across the a/b/c hosts.
    Osm,
    /// OpenStreetMap pinned to one host.
    OsmSingle { subdomain: String },
    /// Stamen Toner.
    StamenToner,
    /// Google Static Maps (requires API key).
    GoogleStatic {
        map_type: GoogleMapType,
        api_key: String,
    },
    /// User-supplied `{z}/{x}/{y}` URL template.
    Custom {
        name: String,
        url_template: String,
        subdomains: Vec<String>,
    },
}

impl ProviderConfig {
    pub fn osm() -> Self {
        Self::Osm
    }

    pub fn osm_single(subdomain: impl Into<String>) -> Self {
        Self::OsmSingle {
            subdomain: subdomain.into(),
        }
    }

    pub fn stamen_toner() -> Self {
        Self::StamenToner
    }

    pub fn google_static(map_type: GoogleMapType, api_key: impl Into<String>) -> Self {
        Self::GoogleStatic {
            map_type,
            api_key: api_key.into(),
        }
    }

    pub fn custom(
        name: impl Into<String>,
        url_template: impl Into<String>,
        subdomains: Vec<String>,
    ) -> Self {
        Self::Custom {
            name: name.into(),
            url_template: url_template.into(),
            subdomains,
        }
    }

    /// Short provider name, as accepted by the CLI.
    pub fn name(&self) -> &str {
        match self {
            Self::Osm => "osm",
            Self::OsmSingle { .. } => "osm-single",
            Self::StamenToner => "stamen-toner",
            Self::GoogleStatic { .. } => "google",
            Self::Custom { name, .. } => name,
        }
    }

    /// Returns true if this provider requires an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::GoogleStatic { .. })
    }

    /// Minimum delay between consecutive downloads for this provider.
    ///
    /// Rotating across several hosts allows a shorter per-source delay.
    pub fn default_download_delay(&self) -> Duration {
        match self {
            Self::Osm => ROTATING_DOWNLOAD_DELAY,
            Self::Custom { subdomains, .. } if subdomains.len() > 1 => ROTATING_DOWNLOAD_DELAY,
            _ => DEFAULT_DOWNLOAD_DELAY,
        }
    }

    /// Validates the configuration and constructs the provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` for an empty API key or
    /// subdomain, an invalid URL template or an unusable cache name.
    pub fn build(&self) -> Result<Box<dyn TileProvider>, ProviderError> {
        let provider: Box<dyn TileProvider> = match self {
            Self::Osm => Box::new(TemplateProvider::osm()),
            Self::OsmSingle { subdomain } => Box::new(TemplateProvider::osm_single(subdomain)?),
            Self::StamenToner => Box::new(TemplateProvider::stamen_toner()),
            Self::GoogleStatic { map_type, api_key } => {
                Box::new(GoogleStaticProvider::new(*map_type, api_key.clone())?)
            }
            Self::Custom {
                name,
                url_template,
                subdomains,
            } => Box::new(TemplateProvider::new(
                name.clone(),
                url_template.clone(),
                subdomains.clone(),
            )?),
        };
        Ok(provider)
    }
}

// API keys must never reach log output.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osm => f.write_str("Osm"),
            Self::OsmSingle { subdomain } => f
                .debug_struct("OsmSingle")
                .field("subdomain", subdomain)
                .finish(),
            Self::StamenToner => f.write_str("StamenToner"),
            Self::GoogleStatic { map_type, .. } => f
                .debug_struct("GoogleStatic")
                .field("map_type", map_type)
                .field("api_key", &"<redacted>")
                .finish(),
            Self::Custom {
                name,
                url_template,
                subdomains,
            } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("url_template", url_template)
                .field("subdomains", subdomains)
                .finish(),
        }
    }
}
