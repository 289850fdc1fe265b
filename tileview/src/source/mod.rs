//! Tile sources.
//!
//! A [`TileSource`] combines one provider, the shared disk cache and a
//! rate-limited fetcher. It assembles [`TileSet`]s for viewports, keeps
//! every set it has produced and tracks which one is active.
//!
//! Grids can be loaded in two ways:
//!
//! - [`TileSource::load_immediate`] assembles on the calling thread and
//!   makes the result active.
//! - [`TileSource::request_async`] validates the request, assembles on
//!   Tokio's blocking pool and reports completion as a [`GridLoaded`]
//!   message. The result is *not* made active; that decision belongs to the
//!   caller (usually a [`ViewRequestQueue`](crate::view::ViewRequestQueue)).
//!
//! Tiles that fail to download do not fail the grid. They are logged and
//! recorded as [`TileImage::Unavailable`].

mod config;
mod store;

pub use config::SourceConfig;
pub use store::TileSetStore;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::cache::DiskTileCache;
use crate::coord::{containing_tile, Coordinate, TileIndex};
use crate::error::TileError;
use crate::fetch::TileFetcher;
use crate::grid::{plan_grid, GridPlan, TileImage, TileSet, TileSetId, Viewport};
use crate::provider::{HttpClient, ReqwestClient, TileProvider};

/// Identifier of an asynchronous grid request, unique per source.
pub type RequestId = u64;

/// Completion message for [`TileSource::request_async`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLoaded {
    pub request_id: RequestId,
    pub tile_set_id: TileSetId,
}

struct SourceInner<C: HttpClient> {
    fetcher: TileFetcher<C>,
    cache: DiskTileCache,
    store: TileSetStore,
    next_request: AtomicU64,
}

/// A configured tile source.
///
/// Cloning is cheap and clones share the cache, rate limiter and tile set
/// history.
pub struct TileSource<C: HttpClient + 'static = ReqwestClient> {
    inner: Arc<SourceInner<C>>,
}

impl<C: HttpClient + 'static> Clone for TileSource<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl TileSource<ReqwestClient> {
    /// Creates a source that downloads over HTTP.
    ///
    /// May be called, and the source dropped, on or off a Tokio runtime.
    ///
    /// # Errors
    ///
    /// `TileError::Configuration` if the provider configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self, TileError> {
        let client = ReqwestClient::new()
            .map_err(|e| TileError::Configuration(format!("HTTP client: {}", e)))?;
        Self::with_client(config, client)
    }
}

impl<C: HttpClient + 'static> TileSource<C> {
    /// Creates a source using a caller-supplied HTTP client.
    pub fn with_client(config: SourceConfig, client: C) -> Result<Self, TileError> {
        let provider: Arc<dyn TileProvider> = Arc::from(config.provider.build()?);
        let delay = config.download_delay();

        info!(
            provider = provider.name(),
            cache = provider.cache_name(),
            cache_dir = %config.cache_dir.display(),
            delay_ms = delay.as_millis() as u64,
            "Tile source created"
        );

        Ok(Self {
            inner: Arc::new(SourceInner {
                fetcher: TileFetcher::new(provider, client, delay),
                cache: DiskTileCache::new(config.cache_dir),
                store: TileSetStore::new(),
                next_request: AtomicU64::new(0),
            }),
        })
    }

    pub fn provider_name(&self) -> &str {
        self.inner.fetcher.provider().name()
    }

    /// Name of this source's directory inside the cache root.
    pub fn cache_name(&self) -> &str {
        self.inner.fetcher.provider().cache_name()
    }

    pub fn cache_root(&self) -> &Path {
        self.inner.cache.root()
    }

    /// Returns the cached file for one tile, downloading it on a miss.
    pub fn provide_tile(&self, tile: &TileIndex) -> Result<PathBuf, TileError> {
        self.inner.cache.provide(&self.inner.fetcher, tile)
    }

    /// Provides the tile containing `coordinate` at `zoom`.
    pub fn tile_at(&self, coordinate: Coordinate, zoom: u8) -> Result<(TileIndex, PathBuf), TileError> {
        let tile = containing_tile(coordinate.lon, coordinate.lat, zoom)?;
        let path = self.provide_tile(&tile)?;
        Ok((tile, path))
    }

    /// Assembles a grid on the calling thread and makes it active.
    ///
    /// Blocks for as long as the downloads take, including rate-limit waits.
    ///
    /// # Errors
    ///
    /// `TileError::InvalidInput` for non-finite coordinates or an
    /// unsupported zoom. Individual tile failures are not errors.
    pub fn load_immediate(
        &self,
        lon: f64,
        lat: f64,
        zoom: u8,
        viewport: Viewport,
    ) -> Result<Arc<TileSet>, TileError> {
        let plan = plan_grid(Coordinate::new(lon, lat), zoom, viewport)?;
        let set = self.inner.assemble(plan);
        self.inner.store.set_active(set.id())
    }

    /// Starts assembling a grid in the background.
    ///
    /// Input is validated before anything is spawned, so invalid requests
    /// fail here and never produce a message. On completion a
    /// [`GridLoaded`] is sent on `sender`; if the receiver is gone the
    /// message is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request_async(
        &self,
        lon: f64,
        lat: f64,
        zoom: u8,
        viewport: Viewport,
        sender: UnboundedSender<GridLoaded>,
    ) -> Result<RequestId, TileError> {
        let plan = plan_grid(Coordinate::new(lon, lat), zoom, viewport)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TileError::Configuration(format!("request_async needs a Tokio runtime: {}", e))
        })?;

        let request_id = self.inner.next_request.fetch_add(1, Ordering::Relaxed);
        debug!(request_id, zoom, lon, lat, "Grid request submitted");

        let inner = Arc::clone(&self.inner);
        runtime.spawn_blocking(move || {
            let set = inner.assemble(plan);
            let message = GridLoaded {
                request_id,
                tile_set_id: set.id(),
            };
            if sender.send(message).is_err() {
                debug!(request_id, "Grid result receiver dropped");
            }
        });

        Ok(request_id)
    }

    /// The active tile set, if any grid has been made active yet.
    pub fn active_tile_set(&self) -> Option<Arc<TileSet>> {
        self.inner.store.active()
    }

    /// Makes a previously assembled set active.
    pub fn set_active_tile_set(&self, id: TileSetId) -> Result<Arc<TileSet>, TileError> {
        self.inner.store.set_active(id)
    }

    pub fn tile_set(&self, id: TileSetId) -> Option<Arc<TileSet>> {
        self.inner.store.get(id)
    }

    /// Number of tile sets produced so far. Sets are never discarded.
    pub fn tile_set_count(&self) -> usize {
        self.inner.store.len()
    }

    /// Converts a pixel in the active grid to a coordinate.
    pub fn pixel_to_coordinate(&self, pixel_x: f64, pixel_y: f64) -> Result<Coordinate, TileError> {
        let active = self.active_tile_set().ok_or(TileError::NoActiveTileSet)?;
        Ok(active.pixel_to_coordinate(pixel_x, pixel_y)?)
    }

    /// Converts a coordinate to a pixel in the active grid.
    pub fn coordinate_to_pixel(&self, lon: f64, lat: f64) -> Result<(f64, f64), TileError> {
        let active = self.active_tile_set().ok_or(TileError::NoActiveTileSet)?;
        Ok(active.coordinate_to_pixel(lon, lat)?)
    }
}

impl<C: HttpClient> SourceInner<C> {
    /// Resolves every planned tile in row-major order and stores the set.
    fn assemble(&self, plan: GridPlan) -> Arc<TileSet> {
        let start = Instant::now();
        let cache_name = self.fetcher.provider().cache_name();

        let set = TileSet::assemble(plan, cache_name, |tile| {
            match self.cache.provide(&self.fetcher, tile) {
                Ok(path) => TileImage::Cached { path },
                Err(e) => {
                    warn!(
                        provider = self.fetcher.provider().name(),
                        zoom = tile.zoom,
                        x = tile.x,
                        y = tile.y,
                        error = %e,
                        "Tile unavailable"
                    );
                    TileImage::Unavailable
                }
            }
        });

        let set = self.store.push(set);
        info!(
            provider = self.fetcher.provider().name(),
            tile_set_id = set.id(),
            zoom = set.zoom(),
            tiles = set.tile_count(),
            unavailable = set.tile_count() - set.available_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Grid assembled"
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordError;
    use crate::provider::{CountingHttpClient, ProviderConfig, ProviderError};
    use std::time::Duration;
    use tempfile::TempDir;

    fn source(
        temp: &TempDir,
        response: Result<Vec<u8>, ProviderError>,
    ) -> TileSource<CountingHttpClient> {
        let config = SourceConfig::new(temp.path(), ProviderConfig::osm_single("a"))
            .with_download_delay(Duration::ZERO);
        TileSource::with_client(config, CountingHttpClient::new(response)).unwrap()
    }

    #[test]
    fn test_load_immediate_sets_active() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));

        let set = source
            .load_immediate(10.5, 50.0, 18, Viewport::uniform(128))
            .unwrap();

        assert_eq!(set.id(), 0);
        assert_eq!(source.active_tile_set().unwrap().id(), 0);
        assert_eq!(set.tile_count(), 4);
        assert_eq!(set.available_count(), 4);
        assert_eq!(source.inner.fetcher_calls(), 4);
    }

    #[test]
    fn test_load_immediate_rejects_invalid_input() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));

        let err = source
            .load_immediate(f64::NAN, 0.0, 3, Viewport::uniform(1))
            .unwrap_err();
        assert!(matches!(err, TileError::InvalidInput(_)));
        assert_eq!(source.tile_set_count(), 0);
    }

    #[test]
    fn test_failed_tiles_are_unavailable() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Err(ProviderError::HttpStatus(503)));

        let set = source
            .load_immediate(10.5, 50.0, 18, Viewport::uniform(128))
            .unwrap();
        assert_eq!(set.tile_count(), 4);
        assert_eq!(set.available_count(), 0);
    }

    #[test]
    fn test_second_grid_served_from_cache() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));

        source.load_immediate(10.5, 50.0, 18, Viewport::uniform(128)).unwrap();
        let second = source.load_immediate(10.5, 50.0, 18, Viewport::uniform(128)).unwrap();

        assert_eq!(second.id(), 1);
        assert_eq!(source.inner.fetcher_calls(), 4);
        assert_eq!(source.tile_set_count(), 2);
    }

    #[test]
    fn test_pixel_conversion_requires_active_set() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));

        assert!(matches!(
            source.pixel_to_coordinate(0.0, 0.0),
            Err(TileError::NoActiveTileSet)
        ));

        let set = source.load_immediate(10.5, 50.0, 18, Viewport::uniform(128)).unwrap();
        let (ax, ay) = source.coordinate_to_pixel(10.5, 50.0).unwrap();
        assert_eq!((ax, ay), set.anchor_px());
        let c = source.pixel_to_coordinate(ax, ay).unwrap();
        assert!((c.lon - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_tile_at_rounds_down() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));

        let (tile, path) = source.tile_at(Coordinate::new(10.5, 50.0), 18).unwrap();
        assert_eq!((tile.x, tile.y), (138717, 88904));
        assert_eq!(path, temp.path().join("osm-a/18/138717/88904.png"));
    }

    #[test]
    fn test_set_active_unknown() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));
        assert!(matches!(
            source.set_active_tile_set(3),
            Err(TileError::UnknownTileSet { id: 3, count: 0 })
        ));
    }

    #[test]
    fn test_request_async_outside_runtime() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = source
            .request_async(0.0, 0.0, 1, Viewport::uniform(1), tx)
            .unwrap_err();
        assert!(matches!(err, TileError::Configuration(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_request_async_delivers_result() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let id = source
            .request_async(10.5, 50.0, 18, Viewport::uniform(128), tx)
            .unwrap();
        let loaded = rx.recv().await.unwrap();

        assert_eq!(loaded.request_id, id);
        assert_eq!(source.tile_set(loaded.tile_set_id).unwrap().tile_count(), 4);
        // Async loads never change the active set on their own.
        assert!(source.active_tile_set().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_request_async_rejects_invalid_zoom() {
        let temp = TempDir::new().unwrap();
        let source = source(&temp, Ok(vec![1]));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = source
            .request_async(0.0, 0.0, 40, Viewport::uniform(1), tx)
            .unwrap_err();
        assert!(matches!(err, TileError::InvalidInput(CoordError::InvalidZoom(40))));
    }

    impl SourceInner<CountingHttpClient> {
        fn fetcher_calls(&self) -> usize {
            self.fetcher.client().calls()
        }
    }
}
