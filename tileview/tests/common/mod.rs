//! Shared helpers for integration tests. No test here touches the network.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tileview::provider::{HttpClient, ProviderConfig, ProviderError};
use tileview::source::{SourceConfig, TileSource};

/// Bytes served for every tile. Content is never decoded.
pub const TILE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// HTTP client that counts requests and always succeeds.
#[derive(Clone, Default)]
pub struct CountingClient {
    calls: Arc<AtomicUsize>,
}

impl CountingClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for CountingClient {
    fn get(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TILE_BYTES.to_vec())
    }
}

/// HTTP client whose requests block until [`GatedClient::release`] is called.
#[derive(Clone, Default)]
pub struct GatedClient {
    gate: Arc<(Mutex<bool>, Condvar)>,
}

impl GatedClient {
    pub fn release(&self) {
        let (open, cv) = &*self.gate;
        *open.lock().unwrap() = true;
        cv.notify_all();
    }
}

impl HttpClient for GatedClient {
    fn get(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        let (open, cv) = &*self.gate;
        let mut released = open.lock().unwrap();
        while !*released {
            released = cv.wait(released).unwrap();
        }
        Ok(TILE_BYTES.to_vec())
    }
}

/// Source config for the pinned OSM host with the given delay.
pub fn osm_config(cache_dir: &Path, delay: Duration) -> SourceConfig {
    SourceConfig::new(cache_dir, ProviderConfig::osm_single("a")).with_download_delay(delay)
}

/// Tile source backed by `client` with no download delay.
pub fn source_with<C: HttpClient + 'static>(cache_dir: &Path, client: C) -> TileSource<C> {
    TileSource::with_client(osm_config(cache_dir, Duration::ZERO), client).unwrap()
}
