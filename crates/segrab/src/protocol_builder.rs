//! # Protocol Builders
//!
//! Fluent builder for [`HlsDownloader`] instances.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    DownloadError, DownloaderConfig,
    hls::{HlsDownloader, OnProgress, config::HlsConfig},
    transport::Transport,
};

/// Builder for HLS downloaders
#[derive(Default)]
pub struct HlsProtocolBuilder {
    config: HlsConfig,
    transport: Option<Arc<dyn Transport>>,
    on_progress: Option<OnProgress>,
}

impl HlsProtocolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the HTTP client configuration
    pub fn with_base_config(mut self, base_config: DownloaderConfig) -> Self {
        self.config.base = base_config;
        self
    }

    // --- Base DownloaderConfig methods ---

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.base.user_agent = user_agent.into();
        self
    }

    /// Bound every request, body included, by `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.base.request_timeout = Some(timeout);
        self
    }

    // --- HLS methods ---

    /// Segments per batch (maximum in-flight segment downloads)
    pub fn download_concurrency(mut self, concurrency: usize) -> Self {
        self.config.download_concurrency = concurrency;
        self
    }

    /// Maximum number of master playlists followed before giving up
    pub fn max_variant_depth(mut self, depth: usize) -> Self {
        self.config.max_variant_depth = depth;
        self
    }

    /// Use a custom transport instead of the reqwest-based one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn on_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn get_config(&self) -> HlsConfig {
        self.config.clone()
    }

    pub fn build(self) -> Result<HlsDownloader, DownloadError> {
        let downloader = match self.transport {
            Some(transport) => HlsDownloader::with_transport(self.config, transport)?,
            None => HlsDownloader::new(self.config)?,
        };
        Ok(match self.on_progress {
            Some(on_progress) => downloader.with_progress(on_progress),
            None => downloader,
        })
    }
}
