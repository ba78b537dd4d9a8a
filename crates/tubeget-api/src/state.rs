//! Application state.
//!
//! Constructed once at startup and injected into handlers; nothing here
//! is ambient global state, so tests can build isolated instances. Both
//! invocation modes sit behind seams (`MetadataFetcher` for metadata,
//! `StreamOpener` for the byte stream), wired to the real yt-dlp
//! invoker in `new` and to scripted implementations in handler tests.

use std::sync::Arc;

use tubeget_extract::{
    MetadataCache, MetadataFetcher, Resolver, StrategyCatalog, StreamOpener, YtDlp,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub resolver: Arc<Resolver>,
    pub cache: Arc<MetadataCache>,
    /// Stream-mode invoker for the download path.
    pub streamer: Arc<dyn StreamOpener>,
}

impl AppState {
    /// Create application state backed by the real yt-dlp invoker.
    pub fn new(config: ApiConfig) -> Self {
        let invoker = Arc::new(YtDlp::new().with_metadata_timeout(config.metadata_timeout));
        Self::from_parts(config, invoker.clone(), invoker)
    }

    /// Wire state from explicit fetcher and streamer implementations.
    pub fn from_parts(
        config: ApiConfig,
        fetcher: Arc<dyn MetadataFetcher>,
        streamer: Arc<dyn StreamOpener>,
    ) -> Self {
        let catalog = StrategyCatalog::new(&config.cookies_path);
        let resolver =
            Resolver::new(catalog, fetcher).with_retry_delay(config.resolver_retry_delay);

        Self {
            config,
            resolver: Arc::new(resolver),
            cache: Arc::new(MetadataCache::new()),
            streamer,
        }
    }
}
