//! Disk-backed, append-only tile cache.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::path::{tile_directory, tile_path};
use crate::coord::TileIndex;
use crate::error::TileError;
use crate::fetch::TileFetcher;
use crate::provider::HttpClient;

/// Tile cache rooted at one directory.
///
/// Entries are written once and never replaced. Several caches (in this or
/// other processes) may share a root; concurrent writers of the same tile
/// each place a complete file and the first one to land is kept.
#[derive(Debug, Clone)]
pub struct DiskTileCache {
    root: PathBuf,
}

impl DiskTileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a tile occupies (or would occupy) in this cache.
    pub fn path_for(&self, cache_name: &str, tile: &TileIndex) -> PathBuf {
        tile_path(&self.root, cache_name, tile)
    }

    /// Returns the cached file for `tile`, if present.
    pub fn lookup(&self, cache_name: &str, tile: &TileIndex) -> Option<PathBuf> {
        let path = self.path_for(cache_name, tile);
        path.is_file().then_some(path)
    }

    /// Writes `bytes` as the cache entry for `tile`.
    ///
    /// The data goes to a temporary file in the destination directory which
    /// is then moved into place without overwriting. An entry that already
    /// exists wins and the new bytes are discarded.
    pub fn store(&self, cache_name: &str, tile: &TileIndex, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = tile_directory(&self.root, cache_name, tile);
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        let path = self.path_for(cache_name, tile);
        match temp.persist_noclobber(&path) {
            Ok(_) => Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(
                    cache = cache_name,
                    zoom = tile.zoom,
                    x = tile.x,
                    y = tile.y,
                    "Tile already cached by another writer"
                );
                Ok(path)
            }
            Err(e) => Err(e.error),
        }
    }

    /// Returns the cached file for `tile`, downloading and storing it on a
    /// miss.
    ///
    /// Concurrent misses for one tile through the same fetcher download it
    /// once; later callers find the stored file when their turn comes.
    ///
    /// # Errors
    ///
    /// `TileError::FetchFailed` if the download fails (nothing is written),
    /// `TileError::Io` if the downloaded tile cannot be stored.
    pub fn provide<C: HttpClient>(
        &self,
        fetcher: &TileFetcher<C>,
        tile: &TileIndex,
    ) -> Result<PathBuf, TileError> {
        let cache_name = fetcher.provider().cache_name();

        if let Some(path) = self.lookup(cache_name, tile) {
            debug!(
                cache = cache_name,
                zoom = tile.zoom,
                x = tile.x,
                y = tile.y,
                "Cache hit"
            );
            return Ok(path);
        }

        debug!(
            cache = cache_name,
            zoom = tile.zoom,
            x = tile.x,
            y = tile.y,
            "Cache miss"
        );

        // Checked again once it is our turn to download: another assembly
        // on this source may have fetched the tile while we waited.
        fetcher.fetch_unless(
            tile,
            || self.lookup(cache_name, tile),
            |bytes| {
                self.store(cache_name, tile, &bytes).map_err(|e| {
                    warn!(
                        cache = cache_name,
                        zoom = tile.zoom,
                        x = tile.x,
                        y = tile.y,
                        error = %e,
                        "Failed to write tile to cache"
                    );
                    TileError::Io(e)
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CountingHttpClient, ProviderError, TemplateProvider, TileProvider};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fetcher(response: Result<Vec<u8>, ProviderError>) -> TileFetcher<CountingHttpClient> {
        let provider: Arc<dyn TileProvider> = Arc::new(TemplateProvider::osm_single("a").unwrap());
        TileFetcher::new(provider, CountingHttpClient::new(response), Duration::ZERO)
    }

    #[test]
    fn test_lookup_missing() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let tile = TileIndex::new(1, 2, 3).unwrap();
        assert!(cache.lookup("osm", &tile).is_none());
    }

    #[test]
    fn test_store_then_lookup() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let tile = TileIndex::new(1, 2, 3).unwrap();

        let path = cache.store("osm", &tile, b"png-bytes").unwrap();
        assert_eq!(path, temp.path().join("osm/3/1/2.png"));
        assert_eq!(cache.lookup("osm", &tile), Some(path.clone()));
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_store_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let tile = TileIndex::new(0, 0, 0).unwrap();

        cache.store("osm", &tile, b"first").unwrap();
        let path = cache.store("osm", &tile, b"second").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"first");
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let tile = TileIndex::new(4, 4, 4).unwrap();

        cache.store("osm", &tile, b"a").unwrap();
        cache.store("osm", &tile, b"b").unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path().join("osm/4/4"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("4.png")]);
    }

    #[test]
    fn test_provide_fetches_once() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let fetcher = fetcher(Ok(vec![9, 9]));
        let tile = TileIndex::new(7, 8, 9).unwrap();

        let first = cache.provide(&fetcher, &tile).unwrap();
        let second = cache.provide(&fetcher, &tile).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, temp.path().join("osm-a/9/7/8.png"));
        assert_eq!(fetcher.provider().cache_name(), "osm-a");
    }

    #[test]
    fn test_provide_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let fetcher = fetcher(Err(ProviderError::HttpStatus(404)));
        let tile = TileIndex::new(7, 8, 9).unwrap();

        let err = cache.provide(&fetcher, &tile).unwrap_err();
        assert!(matches!(err, TileError::FetchFailed(ProviderError::HttpStatus(404))));
        assert!(cache.lookup("osm-a", &tile).is_none());
    }

    /// Client that takes a while to answer, so concurrent callers pile up
    /// behind the rate limiter.
    struct SlowClient {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl HttpClient for SlowClient {
        fn get(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(vec![1, 2, 3])
        }
    }

    #[test]
    fn test_concurrent_misses_download_once() {
        let temp = TempDir::new().unwrap();
        let cache = DiskTileCache::new(temp.path());
        let provider: Arc<dyn TileProvider> = Arc::new(TemplateProvider::osm_single("a").unwrap());
        let client = SlowClient {
            calls: std::sync::atomic::AtomicUsize::new(0),
        };
        let fetcher = TileFetcher::new(provider, client, Duration::from_millis(100));
        let tile = TileIndex::new(1, 1, 2).unwrap();

        let paths: Vec<PathBuf> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| cache.provide(&fetcher, &tile).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(
            fetcher
                .client()
                .calls
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
        assert!(paths.iter().all(|p| *p == temp.path().join("osm-a/2/1/1.png")));
    }

    #[test]
    fn test_provide_reports_store_failure() {
        let temp = TempDir::new().unwrap();
        // A file where the cache name directory should be.
        std::fs::write(temp.path().join("osm-a"), b"not a directory").unwrap();
        let cache = DiskTileCache::new(temp.path());
        let fetcher = fetcher(Ok(vec![1]));

        let err = cache
            .provide(&fetcher, &TileIndex::new(0, 0, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, TileError::Io(_)));
        assert_eq!(fetcher.client().calls(), 1);
    }
}
