// Output sinks. Segments arrive already ordered; a sink only appends.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::DownloadError;

/// Append-only byte sink that the downloader writes segments into.
///
/// The caller guarantees ordering and calls [`SegmentSink::close`] exactly once,
/// on success and on failure alike.
#[async_trait]
pub trait SegmentSink: Send {
    async fn write_segment(&mut self, data: &[u8]) -> Result<(), DownloadError>;

    /// Flushes buffered data and releases the underlying resource.
    async fn close(&mut self) -> Result<(), DownloadError>;
}

/// [`SegmentSink`] writing to a file opened in create+truncate mode.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    bytes_written: u64,
}

impl FileSink {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, DownloadError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        debug!(path = %path.display(), "Opened output file");
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[async_trait]
impl SegmentSink for FileSink {
    async fn write_segment(&mut self, data: &[u8]) -> Result<(), DownloadError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            DownloadError::Io(std::io::Error::other(format!(
                "write to closed output {}",
                self.path.display()
            )))
        })?;
        writer.write_all(data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DownloadError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.into_inner().sync_all().await?;
            debug!(
                path = %self.path.display(),
                bytes = self.bytes_written,
                "Closed output file"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_appends_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ts");
        tokio::fs::write(&path, b"stale content that must disappear")
            .await
            .unwrap();

        let mut sink = FileSink::create(&path).await.unwrap();
        sink.write_segment(b"abc").await.unwrap();
        sink.write_segment(b"def").await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(sink.bytes_written(), 6);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::create(dir.path().join("out.ts")).await.unwrap();
        sink.close().await.unwrap();
        // closing twice is harmless
        sink.close().await.unwrap();
        assert!(matches!(
            sink.write_segment(b"x").await,
            Err(DownloadError::Io(_))
        ));
    }
}
