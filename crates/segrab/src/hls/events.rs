use std::sync::Arc;

/// Observational events emitted while a download runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// The source resolved to a media playlist.
    PlaylistResolved {
        /// URL of the media playlist that will be downloaded.
        url: String,
        /// Number of segments it lists.
        segments: usize,
    },
    /// One segment has been written to the sink ("advance by 1 of N").
    SegmentWritten {
        index: usize,
        written: usize,
        total: usize,
        bytes: usize,
    },
    /// Every segment was written and the sink was closed.
    Finished { segments: usize, bytes: u64 },
}

/// Callback receiving [`DownloadEvent`]s. It has no effect on control flow.
pub type OnProgress = Arc<dyn Fn(DownloadEvent) + Send + Sync>;
