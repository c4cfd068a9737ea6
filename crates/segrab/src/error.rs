use std::error::Error as StdError;

/// Boxed error produced by a transport implementation.
pub type BoxError = Box<dyn StdError + Send + Sync>;

// Error type for every stage of a download: playlist resolution, segment
// fetching and writing to the output sink.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Network error while fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to fetch {url}: HTTP {status} {reason}")]
    Fetch {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Malformed playlist: {0}")]
    MalformedPlaylist(String),

    #[error("No playable variant found in master playlist {0}")]
    NoVariantFound(String),

    #[error("Segment #{index} ({url}) failed: {source}")]
    SegmentFetch {
        index: usize,
        url: String,
        #[source]
        source: Box<DownloadError>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Playlist at {url} is not valid UTF-8")]
    Encoding { url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DownloadError {
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DownloadError::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Builds a `Fetch` error, filling in the canonical reason phrase of `status`.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        DownloadError::Fetch {
            url: url.into(),
            status,
            reason,
        }
    }

    pub(crate) fn segment(index: usize, url: impl Into<String>, source: DownloadError) -> Self {
        DownloadError::SegmentFetch {
            index,
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// HTTP status carried by this error, looking through a segment failure.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DownloadError::Fetch { status, .. } => Some(*status),
            DownloadError::SegmentFetch { source, .. } => source.http_status(),
            _ => None,
        }
    }
}
