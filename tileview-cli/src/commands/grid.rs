//! Grid command.

use std::fmt;

use clap::Args;
use tileview::grid::{TileImage, TileSet, Viewport};
use tileview::provider::HttpClient;
use tileview::source::TileSource;

use crate::error::CliError;

/// Arguments for the grid command.
#[derive(Debug, Args)]
pub struct GridArgs {
    /// Longitude of the view center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude of the view center in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Zoom level (0-24, provider limits apply)
    #[arg(long)]
    pub zoom: u8,

    /// View width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// View height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Print the assembled tile set as JSON
    #[arg(long)]
    pub json: bool,
}

/// Assemble the grid covering the view and describe it.
pub fn run<C: HttpClient + 'static>(args: GridArgs, source: &TileSource<C>) -> Result<(), CliError> {
    let viewport = Viewport::centered(args.width, args.height);
    let set = source.load_immediate(args.lon, args.lat, args.zoom, viewport)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*set)?);
    } else {
        print!("{}", GridSummary(&set));
    }
    Ok(())
}

/// Human-readable summary of a tile set, one line per tile.
pub struct GridSummary<'a>(pub &'a TileSet);

impl fmt::Display for GridSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.0;
        let bounds = set.tile_bounds();
        let geo = set.geo_bounds();

        writeln!(
            f,
            "Tile set {}: {}x{} tiles at zoom {}",
            set.id(),
            set.column_count(),
            set.row_count(),
            set.zoom()
        )?;
        writeln!(
            f,
            "  Tiles: x {}..={}, y {}..={} ({} of {} available)",
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            set.available_count(),
            set.tile_count()
        )?;
        writeln!(
            f,
            "  Bounds: west {:.6}, north {:.6}, east {:.6}, south {:.6}",
            geo.west, geo.north, geo.east, geo.south
        )?;
        for tile in set.tiles() {
            let (x, y) = tile.offset_px();
            write!(f, "  {:<16} +{},{}  ", tile.index().to_string(), x, y)?;
            match tile.image() {
                TileImage::Cached { path } => writeln!(f, "{}", path.display())?,
                TileImage::Unavailable => writeln!(f, "unavailable")?,
            }
        }
        Ok(())
    }
}
