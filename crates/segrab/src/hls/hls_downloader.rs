// HLS Downloader: resolves the source URL to a media playlist and assembles
// its segments into a single output file.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::events::{DownloadEvent, OnProgress};
use crate::hls::output::{FileSink, SegmentSink};
use crate::hls::playlist::{MediaPlaylist, PlaylistEngine};
use crate::hls::scheduler::{BatchedDownloader, DownloadSummary};
use crate::transport::{HttpTransport, Transport};

pub struct HlsDownloader {
    config: HlsConfig,
    transport: Arc<dyn Transport>,
    on_progress: Option<OnProgress>,
}

impl HlsDownloader {
    /// Creates a downloader that talks HTTP through a client built from `config.base`.
    pub fn new(config: HlsConfig) -> Result<Self, DownloadError> {
        let transport = HttpTransport::from_config(&config.base)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: HlsConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, DownloadError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            on_progress: None,
        })
    }

    pub fn with_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn config(&self) -> &HlsConfig {
        &self.config
    }

    fn emit(&self, event: DownloadEvent) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }

    /// Resolves `source_url` down to a media playlist without downloading segments.
    pub async fn resolve(&self, source_url: &str) -> Result<MediaPlaylist, DownloadError> {
        validate_source_url(source_url)?;
        let engine = PlaylistEngine::new(Arc::clone(&self.transport), self.config.max_variant_depth);
        let media = engine.resolve_media_playlist(source_url).await?;
        self.emit(DownloadEvent::PlaylistResolved {
            url: media.url.clone(),
            segments: media.segments.len(),
        });
        Ok(media)
    }

    /// Downloads the stream at `source_url` into `sink`. The sink is closed on
    /// every path once segment download has started.
    pub async fn download_into<S>(
        &self,
        source_url: &str,
        sink: &mut S,
    ) -> Result<DownloadSummary, DownloadError>
    where
        S: SegmentSink + ?Sized,
    {
        let media = self.resolve(source_url).await?;
        self.write_media(media, sink).await
    }

    /// Downloads the stream at `source_url` into a file at `output_path`.
    ///
    /// The file is created (or truncated) only after the playlist resolved. If a
    /// segment fails the file is left behind incomplete.
    pub async fn download(
        &self,
        source_url: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<DownloadSummary, DownloadError> {
        let media = self.resolve(source_url).await?;
        let mut sink = FileSink::create(output_path.as_ref()).await?;
        let summary = self.write_media(media, &mut sink).await?;
        info!(
            path = %sink.path().display(),
            segments = summary.segments,
            bytes = summary.bytes,
            "Download complete"
        );
        Ok(summary)
    }

    async fn write_media<S>(
        &self,
        media: MediaPlaylist,
        sink: &mut S,
    ) -> Result<DownloadSummary, DownloadError>
    where
        S: SegmentSink + ?Sized,
    {
        debug!(
            playlist = %media.url,
            segments = media.segments.len(),
            concurrency = self.config.download_concurrency,
            "Starting segment download"
        );
        BatchedDownloader::new(Arc::clone(&self.transport), self.config.concurrency()?)
            .with_progress(self.on_progress.clone())
            .run(media.segments, sink)
            .await
    }
}

fn validate_source_url(source_url: &str) -> Result<(), DownloadError> {
    let url = Url::parse(source_url)
        .map_err(|e| DownloadError::InvalidUrl(format!("{source_url}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DownloadError::InvalidUrl(format!(
            "{source_url}: unsupported scheme '{scheme}'"
        ))),
    }
}

/// Downloads `source_url` into `output_path` with `concurrency` segments per
/// batch, using the default HTTP client configuration.
pub async fn download(
    source_url: &str,
    output_path: impl AsRef<Path>,
    concurrency: usize,
) -> Result<DownloadSummary, DownloadError> {
    let config = HlsConfig {
        download_concurrency: concurrency,
        ..Default::default()
    };
    HlsDownloader::new(config)?
        .download(source_url, output_path)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hls::test_support::{EventLog, MockResponse, MockTransport, RecordingSink};
    use parking_lot::Mutex;

    const MASTER: &str = "#EXTM3U\n\
        #EXT-X-STREAM-INF:BANDWIDTH=400000,RESOLUTION=640x360\n\
        360p/index.m3u8\n\
        #EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720\n\
        720p/index.m3u8\n";

    const MEDIA: &str = "#EXTM3U\n\
        #EXT-X-TARGETDURATION:6\n\
        #EXTINF:6.0,\n\
        seg0.ts\n\
        #EXTINF:6.0,\n\
        seg1.ts\n\
        #EXTINF:6.0,\n\
        /cdn/seg2.ts\n\
        #EXT-X-ENDLIST\n";

    fn stream_transport() -> MockTransport {
        MockTransport::new()
            .with("http://h/live/master.m3u8", MockResponse::text(MASTER))
            .with("http://h/live/720p/index.m3u8", MockResponse::text(MEDIA))
            .with("http://h/live/720p/seg0.ts", MockResponse::delayed("AAA", 30))
            .with("http://h/live/720p/seg1.ts", MockResponse::delayed("BBB", 10))
            .with("http://h/cdn/seg2.ts", MockResponse::text("CCC"))
    }

    fn downloader(transport: MockTransport, concurrency: usize) -> HlsDownloader {
        let config = HlsConfig {
            download_concurrency: concurrency,
            ..Default::default()
        };
        HlsDownloader::with_transport(config, Arc::new(transport)).unwrap()
    }

    #[tokio::test]
    async fn test_master_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let events = Arc::new(Mutex::new(Vec::<DownloadEvent>::new()));
        let recorded = Arc::clone(&events);

        let summary = downloader(stream_transport(), 2)
            .with_progress(Arc::new(move |event: DownloadEvent| recorded.lock().push(event)))
            .download("http://h/live/master.m3u8", &output)
            .await
            .unwrap();

        assert_eq!(summary, DownloadSummary { segments: 3, bytes: 9 });
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"AAABBBCCC");

        let events = events.lock();
        assert_eq!(
            events.first(),
            Some(&DownloadEvent::PlaylistResolved {
                url: "http://h/live/720p/index.m3u8".to_string(),
                segments: 3,
            })
        );
        assert_eq!(
            events.last(),
            Some(&DownloadEvent::Finished { segments: 3, bytes: 9 })
        );
    }

    #[tokio::test]
    async fn test_empty_media_playlist_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.ts");
        let transport = MockTransport::new().with(
            "http://h/empty.m3u8",
            MockResponse::text("#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXT-X-ENDLIST\n"),
        );

        let summary = downloader(transport, 10)
            .download("http://h/empty.m3u8", &output)
            .await
            .unwrap();

        assert_eq!(summary.segments, 0);
        assert!(tokio::fs::read(&output).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_segment_error_leaves_closed_partial_output() {
        let log = EventLog::default();
        let transport = MockTransport::with_log(log.clone())
            .with("http://h/a.m3u8", MockResponse::text("seg0.ts\nseg1.ts\nseg2.ts\n"))
            .with("http://h/seg0.ts", MockResponse::text("0"))
            .with("http://h/seg1.ts", MockResponse::text("1"));
        let mut sink = RecordingSink::new(log);

        let err = downloader(transport, 2)
            .download_into("http://h/a.m3u8", &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::SegmentFetch { index: 2, .. }));
        assert_eq!(err.http_status(), Some(404));
        assert_eq!(sink.contents(), b"01");
        assert_eq!(sink.closes, 1);
    }

    #[tokio::test]
    async fn test_playlist_failure_does_not_create_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("never.ts");

        let err = downloader(MockTransport::new(), 10)
            .download("http://h/missing.m3u8", &output)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Fetch { status: 404, .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_invalid_source_url() {
        let transport = MockTransport::new();
        let dl = downloader(transport.clone(), 10);

        for source in ["not a url", "ftp://h/a.m3u8"] {
            assert!(matches!(
                dl.resolve(source).await,
                Err(DownloadError::InvalidUrl(_))
            ));
        }
        assert!(transport.issued().is_empty());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = HlsConfig {
            download_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            HlsDownloader::with_transport(config, Arc::new(MockTransport::new())),
            Err(DownloadError::Config(_))
        ));
    }
}
