//! # Segrab
//!
//! Downloads an HLS stream into a single file.
//!
//! The source URL is resolved down to one media playlist (following master
//! playlists and picking the highest-bandwidth variant), then its segments are
//! fetched in bounded, barrier-synchronised batches and appended to the output
//! in playback order.
//!
//! ```no_run
//! # async fn run() -> Result<(), segrab_engine::DownloadError> {
//! let summary = segrab_engine::download("https://example.com/master.m3u8", "out.ts", 10).await?;
//! println!("{} segments, {} bytes", summary.segments, summary.bytes);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hls;
pub mod protocol_builder;
pub mod transport;

pub use client::create_client;
pub use config::{DownloaderConfig, ProxyConfig, ProxyMode};
pub use error::DownloadError;
pub use hls::{DownloadEvent, DownloadSummary, HlsConfig, HlsDownloader, OnProgress, download};
pub use protocol_builder::HlsProtocolBuilder;
pub use transport::{HttpTransport, Transport};
