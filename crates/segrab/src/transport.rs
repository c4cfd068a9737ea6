//! The HTTP seam used by playlist resolution and segment download.
//!
//! Everything above this module talks to a [`Transport`]; the default
//! [`HttpTransport`] wraps a `reqwest::Client`. Tests plug in in-memory
//! implementations.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, trace};

use crate::client::create_client;
use crate::{DownloadError, DownloaderConfig};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns its body.
    ///
    /// Must fail with [`DownloadError::Fetch`] on a non-2xx status and with
    /// [`DownloadError::Network`] when no response could be obtained.
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError>;

    /// Fetches `url` and decodes the body as UTF-8 text.
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let body = self.fetch(url).await?;
        String::from_utf8(body.to_vec()).map_err(|_| DownloadError::Encoding {
            url: url.to_string(),
        })
    }
}

/// [`Transport`] backed by a `reqwest::Client`. No retries are attempted.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    pub fn from_config(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        Ok(Self::new(create_client(config)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError> {
        trace!(url = %url, "GET");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        debug!(url = %url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}
