//! Static map bounds command.

use clap::Args;
use tileview::coord::{static_map_bounds, Coordinate};

use crate::error::CliError;

/// Arguments for the bounds command.
#[derive(Debug, Args)]
pub struct BoundsArgs {
    /// Longitude of the map center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude of the map center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Zoom level (0-24)
    #[arg(long)]
    pub zoom: u8,

    /// Map width in pixels
    #[arg(long, default_value = "256")]
    pub width: u32,

    /// Map height in pixels
    #[arg(long, default_value = "256")]
    pub height: u32,

    /// Print the box as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print the geographic box covered by a static map image.
pub fn run(args: BoundsArgs) -> Result<(), CliError> {
    let bounds = static_map_bounds(
        Coordinate::new(args.lon, args.lat),
        args.zoom,
        args.width,
        args.height,
    )
    .map_err(|e| CliError::Tile(e.into()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bounds)?);
    } else {
        println!("west:  {:.6}", bounds.west);
        println!("north: {:.6}", bounds.north);
        println!("east:  {:.6}", bounds.east);
        println!("south: {:.6}", bounds.south);
    }
    Ok(())
}
