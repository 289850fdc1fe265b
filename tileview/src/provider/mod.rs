//! Map tile provider abstraction
//!
//! This module provides the [`TileProvider`] capability (tile addressing
//! and cache naming), the [`HttpClient`] abstraction used to download tiles,
//! and the concrete providers selectable through [`ProviderConfig`].
//!
//! # Example
//!
//! ```
//! use tileview::coord::TileIndex;
//! use tileview::provider::ProviderConfig;
//!
//! let provider = ProviderConfig::osm_single("a").build().unwrap();
//! let url = provider.tile_url(&TileIndex::new(1, 2, 3).unwrap()).unwrap();
//! assert_eq!(url, "http://a.tile.openstreetmap.org/3/1/2.png");
//! ```

mod factory;
mod google;
mod http;
mod template;
mod types;

pub use factory::ProviderConfig;
pub use google::{GoogleMapType, GoogleStaticProvider};
pub use http::{HttpClient, ReqwestClient, DEFAULT_HTTP_TIMEOUT, USER_AGENT};
pub use template::TemplateProvider;
pub use types::{ProviderError, TileProvider, DEFAULT_DOWNLOAD_DELAY, ROTATING_DOWNLOAD_DELAY};

#[cfg(test)]
pub use http::tests::{CountingHttpClient, MockHttpClient};
