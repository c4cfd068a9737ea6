// In-memory transport and sink used by the engine's unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::DownloadError;
use crate::hls::output::SegmentSink;
use crate::transport::Transport;

/// Everything the mock transport and the recording sink observe, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Issued(String),
    Completed(String),
    Written(Bytes),
    Closed,
}

pub type EventLog = Arc<Mutex<Vec<LogEntry>>>;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Body { data: Bytes, delay: Duration },
    Status(u16),
    NetworkFailure,
}

impl MockResponse {
    pub fn text(content: &str) -> Self {
        Self::bytes(content.as_bytes().to_vec())
    }

    pub fn bytes(data: impl Into<Bytes>) -> Self {
        MockResponse::Body {
            data: data.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(data: impl Into<Bytes>, delay_ms: u64) -> Self {
        MockResponse::Body {
            data: data.into(),
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Scripted [`Transport`]. Unknown URLs answer with HTTP 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    log: EventLog,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            responses: Default::default(),
            log,
        }
    }

    pub fn with(self, url: &str, response: MockResponse) -> Self {
        self.responses.lock().insert(url.to_string(), response);
        self
    }

    /// URLs in the order their fetches were issued.
    pub fn issued(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Issued(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes, DownloadError> {
        self.log.lock().push(LogEntry::Issued(url.to_string()));
        let response = self
            .responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or(MockResponse::Status(404));

        let result = match response {
            MockResponse::Body { data, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(data)
            }
            MockResponse::Status(status) => Err(DownloadError::status(url, status)),
            MockResponse::NetworkFailure => Err(DownloadError::network(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        };
        self.log.lock().push(LogEntry::Completed(url.to_string()));
        result
    }
}

/// [`SegmentSink`] that records writes into an [`EventLog`].
pub struct RecordingSink {
    log: EventLog,
    pub closes: usize,
}

impl RecordingSink {
    pub fn new(log: EventLog) -> Self {
        Self { log, closes: 0 }
    }

    /// Concatenation of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.log
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Written(data) => Some(data.to_vec()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[async_trait]
impl SegmentSink for RecordingSink {
    async fn write_segment(&mut self, data: &[u8]) -> Result<(), DownloadError> {
        self.log
            .lock()
            .push(LogEntry::Written(Bytes::copy_from_slice(data)));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DownloadError> {
        self.closes += 1;
        self.log.lock().push(LogEntry::Closed);
        Ok(())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
