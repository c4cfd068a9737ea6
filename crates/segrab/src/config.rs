//! HTTP client settings shared by playlist and segment requests.
//!
//! ```
//! use std::time::Duration;
//! use segrab_engine::{DownloaderConfig, ProxyConfig, ProxyMode};
//!
//! let config = DownloaderConfig {
//!     request_timeout: Some(Duration::from_secs(60)),
//!     proxy: ProxyMode::Explicit(
//!         ProxyConfig::new("socks5://127.0.0.1:1080").with_credentials("user", "secret"),
//!     ),
//!     ..Default::default()
//! }
//! .with_header("Referer", "https://example.com/")
//! .unwrap();
//!
//! assert!(config.headers.contains_key("referer"));
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::DownloadError;

const DEFAULT_USER_AGENT: &str = concat!("segrab/", env!("CARGO_PKG_VERSION"));

/// Redirect hops followed per request when nothing else is configured.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Upper bound on a whole request including the body. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Longest pause allowed between two reads of a response body.
    pub read_timeout: Option<Duration>,
    /// 0 disables redirect following; a 3xx is then reported as a fetch error.
    pub max_redirects: usize,
    pub user_agent: String,
    /// Sent with every playlist and segment request.
    pub headers: HeaderMap,
    pub proxy: ProxyMode,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        Self {
            request_timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
            read_timeout: Some(Duration::from_secs(30)),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers,
            proxy: ProxyMode::System,
        }
    }
}

impl DownloaderConfig {
    /// Adds one header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, DownloadError> {
        let name: HeaderName = name
            .parse()
            .map_err(|_| DownloadError::Config(format!("invalid header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| DownloadError::Config(format!("invalid value for header {name}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Merges `headers` over the current set; the new values win.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }
}

/// Where requests are routed.
#[derive(Debug, Clone, Default)]
pub enum ProxyMode {
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`ALL_PROXY` and the OS settings.
    #[default]
    System,
    /// Connect directly, ignoring any system proxy.
    Disabled,
    Explicit(ProxyConfig),
}

/// A proxy for every request. The scheme of `url` picks the protocol:
/// `http://`, `https://`, `socks5://` or `socks5h://`. A bare `host:port`
/// is taken as an HTTP proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub credentials: Option<(String, String)>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy, DownloadError> {
        let url = if self.url.contains("://") {
            self.url.clone()
        } else {
            format!("http://{}", self.url)
        };
        let proxy = reqwest::Proxy::all(url.as_str())
            .map_err(|e| DownloadError::Config(format!("invalid proxy URL {:?}: {e}", self.url)))?;
        Ok(match &self.credentials {
            Some((username, password)) => proxy.basic_auth(username, password),
            None => proxy,
        })
    }
}
