//! Single tile command.

use clap::Args;
use tileview::coord::Coordinate;
use tileview::provider::HttpClient;
use tileview::source::TileSource;

use crate::error::CliError;

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Zoom level (0-24, provider limits apply)
    #[arg(long)]
    pub zoom: u8,
}

/// Provide the tile containing the coordinate and print its cache path.
pub fn run<C: HttpClient + 'static>(args: TileArgs, source: &TileSource<C>) -> Result<(), CliError> {
    let (tile, path) = source.tile_at(Coordinate::new(args.lon, args.lat), args.zoom)?;
    tracing::debug!(tile = %tile, provider = source.provider_name(), "Tile provided");
    println!("{}", path.display());
    Ok(())
}
