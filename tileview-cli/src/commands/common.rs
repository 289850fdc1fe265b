//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tileview::provider::{GoogleMapType, ProviderConfig};
use tileview::source::{SourceConfig, TileSource};

use crate::error::CliError;

/// Tile provider selection for CLI arguments.
#[derive(Debug, Clone, ValueEnum, PartialEq)]
pub enum ProviderType {
    /// OpenStreetMap standard tiles, rotating across a/b/c hosts
    Osm,
    /// OpenStreetMap pinned to one host (see --subdomain)
    OsmSingle,
    /// Stamen Toner black and white tiles
    StamenToner,
    /// Google Static Maps (requires API key)
    Google,
    /// Any XYZ server described by --url-template
    Custom,
}

/// Google map type selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum MapTypeArg {
    Roadmap,
    Satellite,
    Hybrid,
    Terrain,
}

impl From<MapTypeArg> for GoogleMapType {
    fn from(arg: MapTypeArg) -> Self {
        match arg {
            MapTypeArg::Roadmap => GoogleMapType::Roadmap,
            MapTypeArg::Satellite => GoogleMapType::Satellite,
            MapTypeArg::Hybrid => GoogleMapType::Hybrid,
            MapTypeArg::Terrain => GoogleMapType::Terrain,
        }
    }
}

/// Tile source flags shared by every command that touches the cache.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Tile provider to use
    #[arg(long, value_enum, default_value = "osm", global = true)]
    pub provider: ProviderType,

    /// Host for --provider osm-single (a, b or c)
    #[arg(long, default_value = "a", global = true)]
    pub subdomain: String,

    /// Map type for --provider google
    #[arg(long, value_enum, default_value = "roadmap", global = true)]
    pub map_type: MapTypeArg,

    /// Google Static Maps API key (required when using --provider google)
    #[arg(long, env = "TILEVIEW_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// URL template for --provider custom, e.g. https://{s}.example.com/{z}/{x}/{y}.png
    #[arg(long, global = true)]
    pub url_template: Option<String>,

    /// Comma-separated subdomains substituted for {s} in --url-template
    #[arg(long, value_delimiter = ',', global = true)]
    pub subdomains: Vec<String>,

    /// Tile cache directory [default: <user cache dir>/tileview]
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Minimum seconds between downloads [default: provider dependent]
    #[arg(long, global = true)]
    pub delay: Option<f64>,
}

impl ProviderType {
    /// Convert to a ProviderConfig, requiring the options each provider needs.
    pub fn to_config(&self, args: &SourceArgs) -> Result<ProviderConfig, CliError> {
        match self {
            ProviderType::Osm => Ok(ProviderConfig::osm()),
            ProviderType::OsmSingle => Ok(ProviderConfig::osm_single(args.subdomain.clone())),
            ProviderType::StamenToner => Ok(ProviderConfig::stamen_toner()),
            ProviderType::Google => {
                let key = args.api_key.clone().ok_or_else(|| {
                    CliError::Config(
                        "Google provider requires an API key. \
                         Use --api-key or set TILEVIEW_API_KEY"
                            .to_string(),
                    )
                })?;
                Ok(ProviderConfig::google_static(args.map_type.into(), key))
            }
            ProviderType::Custom => {
                let template = args.url_template.clone().ok_or_else(|| {
                    CliError::Config("Custom provider requires --url-template".to_string())
                })?;
                Ok(ProviderConfig::custom(
                    "custom",
                    template,
                    args.subdomains.clone(),
                ))
            }
        }
    }
}

impl SourceArgs {
    /// Resolve the cache directory, falling back to the user cache dir.
    pub fn cache_dir(&self) -> Result<PathBuf, CliError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::cache_dir()
                .map(|dir| dir.join("tileview"))
                .ok_or_else(|| {
                    CliError::Config(
                        "Could not determine a cache directory; use --cache-dir".to_string(),
                    )
                }),
        }
    }

    /// Parse --delay into a duration.
    pub fn download_delay(&self) -> Result<Option<Duration>, CliError> {
        match self.delay {
            None => Ok(None),
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                Ok(Some(Duration::from_secs_f64(secs)))
            }
            Some(secs) => Err(CliError::Config(format!(
                "--delay must be a non-negative number of seconds, got {}",
                secs
            ))),
        }
    }

    /// Build the source configuration described by these flags.
    pub fn to_source_config(&self) -> Result<SourceConfig, CliError> {
        let provider = self.provider.to_config(self)?;
        let mut config = SourceConfig::new(self.cache_dir()?, provider);
        if let Some(delay) = self.download_delay()? {
            config = config.with_download_delay(delay);
        }
        Ok(config)
    }

    /// Create the tile source described by these flags.
    pub fn open_source(&self) -> Result<TileSource, CliError> {
        let config = self.to_source_config()?;
        TileSource::new(config).map_err(CliError::SourceCreation)
    }
}
