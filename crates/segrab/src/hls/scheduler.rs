// HLS Segment Scheduler: downloads segments in barrier-synchronised batches
// and writes them to the sink in playback order.
//
// Batch k+1 is not started before every segment of batch k has been fetched
// and written. This keeps at most `concurrency` segment buffers alive and
// makes ordering a sort of one small batch.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::DownloadError;
use crate::hls::events::{DownloadEvent, OnProgress};
use crate::hls::output::SegmentSink;
use crate::hls::playlist::Segment;
use crate::transport::Transport;

/// What a completed download produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadSummary {
    pub segments: usize,
    pub bytes: u64,
}

pub struct BatchedDownloader {
    transport: Arc<dyn Transport>,
    concurrency: NonZeroUsize,
    on_progress: Option<OnProgress>,
}

impl BatchedDownloader {
    pub fn new(transport: Arc<dyn Transport>, concurrency: NonZeroUsize) -> Self {
        Self {
            transport,
            concurrency,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<OnProgress>) -> Self {
        self.on_progress = on_progress;
        self
    }

    fn emit(&self, event: DownloadEvent) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }

    async fn fetch_segment(
        transport: Arc<dyn Transport>,
        mut segment: Segment,
    ) -> Result<Segment, DownloadError> {
        match transport.fetch(&segment.url).await {
            Ok(data) => {
                debug!(index = segment.index, bytes = data.len(), "Segment fetched");
                segment.data = Some(data);
                Ok(segment)
            }
            Err(e) => {
                error!(index = segment.index, url = %segment.url, error = %e, "Segment download failed");
                Err(DownloadError::segment(segment.index, segment.url, e))
            }
        }
    }

    /// Fetches one batch concurrently and returns it sorted by index.
    ///
    /// The first failure is returned immediately; dropping the remaining
    /// futures cancels the sibling fetches of that batch.
    async fn fetch_batch(&self, batch: &[Segment]) -> Result<Vec<Segment>, DownloadError> {
        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .cloned()
            .map(|segment| Self::fetch_segment(Arc::clone(&self.transport), segment))
            .collect();

        let mut fetched = Vec::with_capacity(batch.len());
        while let Some(result) = in_flight.next().await {
            fetched.push(result?);
        }
        fetched.sort_by_key(|segment| segment.index);
        Ok(fetched)
    }

    async fn write_batches<S>(
        &self,
        segments: Vec<Segment>,
        sink: &mut S,
    ) -> Result<DownloadSummary, DownloadError>
    where
        S: SegmentSink + ?Sized,
    {
        let total = segments.len();
        let mut summary = DownloadSummary::default();

        for (batch_no, batch) in segments.chunks(self.concurrency.get()).enumerate() {
            debug!(
                batch = batch_no,
                size = batch.len(),
                first_index = batch[0].index,
                "Fetching batch"
            );
            for segment in self.fetch_batch(batch).await? {
                let data = segment.data.unwrap_or_default();
                sink.write_segment(&data).await?;

                summary.segments += 1;
                summary.bytes += data.len() as u64;
                self.emit(DownloadEvent::SegmentWritten {
                    index: segment.index,
                    written: summary.segments,
                    total,
                    bytes: data.len(),
                });
            }
        }
        Ok(summary)
    }

    /// Downloads `segments` into `sink` in index order.
    ///
    /// The sink is closed exactly once whatever the outcome. On failure the
    /// sink holds an incomplete stream and must not be treated as valid.
    pub async fn run<S>(
        &self,
        segments: Vec<Segment>,
        sink: &mut S,
    ) -> Result<DownloadSummary, DownloadError>
    where
        S: SegmentSink + ?Sized,
    {
        let total = segments.len();
        let result = self.write_batches(segments, sink).await;
        let closed = sink.close().await;

        match (result, closed) {
            (Ok(summary), Ok(())) => {
                info!(
                    segments = summary.segments,
                    bytes = summary.bytes,
                    "All segments written"
                );
                self.emit(DownloadEvent::Finished {
                    segments: summary.segments,
                    bytes: summary.bytes,
                });
                Ok(summary)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), closed) => {
                if let Err(close_error) = closed {
                    warn!(error = %close_error, "Failed to close output after download error");
                }
                warn!(total, error = %e, "Download aborted, output is incomplete");
                Err(e)
            }
        }
    }
}
