use reqwest::Client;
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::DownloadError;
use crate::config::{DownloaderConfig, ProxyMode};

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &DownloaderConfig) -> Result<Client, DownloadError> {
    let provider = Arc::new(aws_lc_rs::default_provider());

    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| DownloadError::Config(format!("TLS protocol versions: {e}")))?
        .with_platform_verifier()
        .map_err(|e| DownloadError::Config(format!("TLS platform verifier: {e}")))?
        .with_no_client_auth();

    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(16)
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .use_preconfigured_tls(tls_config)
        .redirect(match config.max_redirects {
            0 => reqwest::redirect::Policy::none(),
            hops => reqwest::redirect::Policy::limited(hops),
        });

    if let Some(timeout) = config.request_timeout {
        client_builder = client_builder.timeout(timeout);
    }
    if let Some(timeout) = config.connect_timeout {
        client_builder = client_builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.read_timeout {
        client_builder = client_builder.read_timeout(timeout);
    }

    match &config.proxy {
        ProxyMode::Explicit(proxy) => {
            client_builder = client_builder.proxy(proxy.to_reqwest()?);
            info!(proxy_url = %proxy.url, "Routing downloads through explicit proxy");
        }
        // reqwest picks up system proxy settings unless no_proxy() is called
        ProxyMode::System => debug!("Using system proxy settings for downloads"),
        ProxyMode::Disabled => {
            client_builder = client_builder.no_proxy();
            debug!("Proxy disabled for downloads");
        }
    }

    client_builder
        .build()
        .map_err(|e| DownloadError::Config(format!("Failed to build HTTP client: {e}")))
}
