//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tileview::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid command-line configuration
    Config(String),
    /// Failed to create the tile source
    SourceCreation(TileError),
    /// Failed to resolve a tile or grid
    Tile(TileError),
    /// Failed to serialize command output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::SourceCreation(TileError::Configuration(_)) => {
                eprintln!();
                eprintln!("If using the google provider, make sure:");
                eprintln!("  1. --api-key is set to a Static Maps API key");
                eprintln!("  2. --map-type is one of roadmap, satellite, hybrid, terrain");
            }
            CliError::Tile(e) if e.is_recoverable() => {
                eprintln!();
                eprintln!("The tile server could not be reached or refused the request.");
                eprintln!("Cached tiles remain usable; try again later or raise --delay.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::SourceCreation(e) => write!(f, "Failed to create tile source: {}", e),
            CliError::Tile(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::SourceCreation(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
