use indicatif::{ProgressBar, ProgressStyle};
use segrab_engine::DownloadEvent;
use std::time::Duration;

fn segment_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} segments ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Renders download events as a single progress bar.
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(segment_style());
        Self { bar }
    }

    pub fn new_disabled() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn handle_event(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::PlaylistResolved { url, segments } => {
                self.bar.set_length(segments as u64);
                self.bar.set_message(format!("Downloading {url}"));
                self.bar.enable_steady_tick(Duration::from_millis(500));
            }
            DownloadEvent::SegmentWritten { .. } => self.bar.inc(1),
            DownloadEvent::Finished { segments, .. } => {
                self.bar
                    .finish_with_message(format!("Finished {segments} segments"));
            }
        }
    }

    /// Stops the bar without marking it finished (used on failure).
    pub fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_follows_events() {
        let progress = ProgressManager::new_disabled();
        progress.handle_event(DownloadEvent::PlaylistResolved {
            url: "http://h/a.m3u8".to_string(),
            segments: 2,
        });
        progress.handle_event(DownloadEvent::SegmentWritten {
            index: 0,
            written: 1,
            total: 2,
            bytes: 10,
        });
        assert_eq!(progress.bar.position(), 1);
        assert_eq!(progress.bar.length(), Some(2));
    }
}
