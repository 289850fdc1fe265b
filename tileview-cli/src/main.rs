//! tileview CLI - Command-line interface
//!
//! Resolves tiles and tile grids through the tileview library, filling the
//! shared tile cache as a side effect.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tileview::logging::{default_log_file, init_logging};

use commands::bounds::BoundsArgs;
use commands::common::SourceArgs;
use commands::grid::GridArgs;
use commands::tile::TileArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "tileview")]
#[command(version)]
#[command(about = "Web Mercator tile grids and tile cache", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory for the log file [default: <cache dir>/logs]
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provide the tile containing a coordinate and print its cache path
    Tile(TileArgs),
    /// Assemble the tile grid covering a view
    Grid(GridArgs),
    /// Print the bounding box of a static map image
    Bounds(BoundsArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let log_dir = match cli.log_dir {
        Some(dir) => dir,
        None => cli.source.cache_dir()?.join("logs"),
    };
    let _logging = init_logging(&log_dir, default_log_file())
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    match cli.command {
        Commands::Tile(args) => commands::tile::run(args, &cli.source.open_source()?),
        Commands::Grid(args) => commands::grid::run(args, &cli.source.open_source()?),
        Commands::Bounds(args) => commands::bounds::run(args),
    }
}
