//! tileview - Web Mercator map tile grids for interactive map views
//!
//! Resolves a viewport (center coordinate, zoom, pixel half-extents) to the
//! grid of 256px tiles that covers it, fetches missing tiles from a remote
//! provider with a per-source rate limit, stores them in an append-only disk
//! cache and hands out immutable [`grid::TileSet`] snapshots.
//!
//! # Layers
//!
//! - [`coord`] - projection between coordinates, tile positions and pixels
//! - [`provider`] - tile URL construction and the HTTP client abstraction
//! - [`fetch`] - rate-limited downloads
//! - [`cache`] - on-disk tile storage
//! - [`grid`] - grid planning and tile set types
//! - [`source`] - grid assembly, tile set history and the active set
//! - [`view`] - ordered, time-bounded view changes driven by a control loop
//!
//! # Example
//!
//! ```no_run
//! use tileview::grid::Viewport;
//! use tileview::provider::ProviderConfig;
//! use tileview::source::{SourceConfig, TileSource};
//!
//! let source = TileSource::new(SourceConfig::new("/tmp/tiles", ProviderConfig::osm()))?;
//! let set = source.load_immediate(10.5, 50.0, 18, Viewport::centered(800, 600))?;
//! for tile in set.tiles() {
//!     println!("{} at {:?}: {:?}", tile.index(), tile.offset_px(), tile.path());
//! }
//! # Ok::<(), tileview::TileError>(())
//! ```

pub mod cache;
pub mod coord;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod logging;
pub mod provider;
pub mod source;
pub mod view;

pub use error::TileError;
