//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`bounds`] - Static map bounding box for a viewport
//! - [`grid`] - Assemble the tile grid covering a viewport
//! - [`tile`] - Provide a single tile and print its cache path

pub mod bounds;
pub mod common;
pub mod grid;
pub mod tile;
