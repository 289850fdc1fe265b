//! Rate-limited tile downloads.
//!
//! A [`TileFetcher`] downloads one tile at a time from its provider. Every
//! download attempt on a fetcher passes through its [`RateLimiter`], which
//! holds a lock across the whole wait-download-stamp sequence. Concurrent
//! assemblies on one source therefore serialize their downloads, while
//! fetchers belonging to different sources never wait on each other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::coord::TileIndex;
use crate::error::TileError;
use crate::provider::{HttpClient, ProviderError, TileProvider};

/// Enforces a minimum delay between consecutive downloads.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_download: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_download: Mutex::new(None),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Runs `download` once the minimum delay since the previous attempt
    /// has passed.
    ///
    /// The timestamp is updated after `download` returns, whether it
    /// succeeded or not. The calling thread sleeps while waiting.
    pub fn run<T>(&self, download: impl FnOnce() -> T) -> T {
        self.run_unless(|| None, download)
    }

    /// Like [`run`](Self::run), but first calls `ready` while holding the
    /// limiter. If it yields a value, that value is returned without
    /// waiting or downloading and the timestamp is left alone.
    ///
    /// Callers that queued behind a download of the same resource use this
    /// to pick up its result instead of repeating it.
    pub fn run_unless<T>(
        &self,
        ready: impl FnOnce() -> Option<T>,
        download: impl FnOnce() -> T,
    ) -> T {
        let mut last = self.last_download.lock();

        if let Some(value) = ready() {
            return value;
        }

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "Rate limit wait");
                std::thread::sleep(wait);
            }
        }

        let result = download();
        *last = Some(Instant::now());
        result
    }
}

/// Downloads tiles for one provider, honoring the provider's rate limit.
pub struct TileFetcher<C: HttpClient> {
    provider: Arc<dyn TileProvider>,
    client: C,
    limiter: RateLimiter,
}

impl<C: HttpClient> TileFetcher<C> {
    /// Creates a fetcher.
    ///
    /// # Arguments
    ///
    /// * `provider` - Builds the URL for each tile
    /// * `client` - Performs the HTTP GET
    /// * `min_delay` - Minimum time between consecutive downloads
    pub fn new(provider: Arc<dyn TileProvider>, client: C, min_delay: Duration) -> Self {
        Self {
            provider,
            client,
            limiter: RateLimiter::new(min_delay),
        }
    }

    pub fn provider(&self) -> &dyn TileProvider {
        self.provider.as_ref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn min_delay(&self) -> Duration {
        self.limiter.min_delay()
    }

    /// Downloads the bytes of one tile.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status or unusable body. Zoom
    /// levels the provider does not serve fail before any network access
    /// and without consuming the rate limit.
    pub fn fetch(&self, tile: &TileIndex) -> Result<Vec<u8>, ProviderError> {
        let url = self.provider.tile_url(tile)?;
        let start = Instant::now();
        self.limiter.run(|| self.download(tile, &url, start))
    }

    /// Downloads one tile and hands the bytes to `keep`, unless `existing`
    /// finds the tile first.
    ///
    /// `existing` runs once this call holds the rate limiter, so a caller
    /// that waited behind another download of the same tile sees that
    /// download's result. `keep` runs before the limiter is released.
    ///
    /// # Errors
    ///
    /// `TileError::FetchFailed` (or `Configuration`) for download failures,
    /// otherwise whatever `keep` returns.
    pub fn fetch_unless<T>(
        &self,
        tile: &TileIndex,
        existing: impl FnOnce() -> Option<T>,
        keep: impl FnOnce(Vec<u8>) -> Result<T, TileError>,
    ) -> Result<T, TileError> {
        let url = self.provider.tile_url(tile)?;
        let start = Instant::now();
        self.limiter.run_unless(
            || existing().map(Ok),
            || -> Result<T, TileError> { keep(self.download(tile, &url, start)?) },
        )
    }

    fn download(
        &self,
        tile: &TileIndex,
        url: &str,
        start: Instant,
    ) -> Result<Vec<u8>, ProviderError> {
        let result = self.client.get(url);
        debug!(
            provider = self.provider.name(),
            zoom = tile.zoom,
            x = tile.x,
            y = tile.y,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Tile download finished"
        );
        result
    }
}
