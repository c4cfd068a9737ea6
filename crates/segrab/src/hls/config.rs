use std::num::NonZeroUsize;

use crate::{DownloadError, DownloaderConfig};

/// Number of segments fetched concurrently when the caller does not say otherwise.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 10;

/// How many master playlists may be followed before giving up on a variant chain.
pub const DEFAULT_MAX_VARIANT_DEPTH: usize = 8;

#[derive(Debug, Clone)]
pub struct HlsConfig {
    /// Base downloader configuration
    pub base: DownloaderConfig,
    /// Segments per batch; also the cap on in-flight segment fetches.
    pub download_concurrency: usize,
    /// Maximum number of master playlists followed while resolving the source URL.
    pub max_variant_depth: usize,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            base: DownloaderConfig::default(),
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            max_variant_depth: DEFAULT_MAX_VARIANT_DEPTH,
        }
    }
}

impl HlsConfig {
    pub fn validate(&self) -> Result<(), DownloadError> {
        self.concurrency()?;
        if self.max_variant_depth == 0 {
            return Err(DownloadError::Config(
                "max variant depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The batch size, rejected when zero.
    pub fn concurrency(&self) -> Result<NonZeroUsize, DownloadError> {
        NonZeroUsize::new(self.download_concurrency).ok_or_else(|| {
            DownloadError::Config("download concurrency must be at least 1".to_string())
        })
    }
}
