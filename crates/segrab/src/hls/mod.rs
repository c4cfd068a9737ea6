// HLS playlist resolution and ordered segment download.

pub mod config;
pub mod events;
pub mod hls_downloader;
pub mod output;
pub mod playlist;
pub mod resolve;
pub mod scheduler;
#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for easier access
pub use config::HlsConfig;
pub use events::{DownloadEvent, OnProgress};
pub use hls_downloader::{HlsDownloader, download};
pub use output::{FileSink, SegmentSink};
pub use playlist::{MediaPlaylist, Playlist, PlaylistEngine, PlaylistKind, Segment, Variant};
pub use resolve::resolve;
pub use scheduler::{BatchedDownloader, DownloadSummary};
