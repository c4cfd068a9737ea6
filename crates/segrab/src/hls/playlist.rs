// HLS Playlist Engine: fetches playlists, tells master from media playlists,
// picks the highest-bandwidth variant and extracts the ordered segment list.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::DownloadError;
use crate::hls::resolve::resolve;
use crate::transport::Transport;

const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF";

/// Raw playlist text together with the URL it was fetched from.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    Master,
    Media,
}

/// A variant stream referenced by a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub bandwidth: u64,
    /// Absolute URI, resolved against the master playlist URL.
    pub uri: String,
}

/// A media segment. `index` is its position in playback order and the only
/// ordering key; `data` is filled in once the fetch completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub url: String,
    pub data: Option<Bytes>,
}

impl Segment {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            data: None,
        }
    }
}

/// A resolved media playlist, ready for download.
#[derive(Debug, Clone)]
pub struct MediaPlaylist {
    pub url: String,
    pub segments: Vec<Segment>,
}

impl Playlist {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> PlaylistKind {
        classify(&self.content)
    }
}

/// A playlist is a master playlist iff any line carries `#EXT-X-STREAM-INF`.
pub fn classify(content: &str) -> PlaylistKind {
    if content.lines().any(|line| line.contains(STREAM_INF_TAG)) {
        PlaylistKind::Master
    } else {
        PlaylistKind::Media
    }
}

/// Splits an attribute list on commas that are not inside a quoted string.
fn split_attributes(list: &str) -> impl Iterator<Item = &str> {
    let mut in_quotes = false;
    list.split(move |c: char| {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        c == ',' && !in_quotes
    })
}

/// Reads the `BANDWIDTH` attribute of a stream-info tag line.
///
/// Only the exact attribute name matches, so `AVERAGE-BANDWIDTH` is ignored.
pub fn parse_bandwidth(tag_line: &str) -> Option<u64> {
    let (_, attributes) = tag_line.trim().split_once(':')?;
    split_attributes(attributes)
        .filter_map(|attribute| attribute.split_once('='))
        .find(|(name, _)| name.trim() == "BANDWIDTH")
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Picks the variant with the strictly greatest bandwidth; on ties the first
/// one in document order is kept.
///
/// Every stream-info tag must be immediately followed by its URI line. A tag
/// that is the last line, or is followed by a blank line or another tag, makes
/// the playlist malformed.
pub fn select_variant(playlist: &Playlist) -> Result<Variant, DownloadError> {
    let mut lines = playlist.content.lines().map(str::trim).enumerate();
    let mut selected: Option<Variant> = None;

    while let Some((line_no, line)) = lines.next() {
        if !line.starts_with(STREAM_INF_TAG) {
            continue;
        }

        let uri = match lines.next() {
            Some((_, next)) if !next.is_empty() && !next.starts_with('#') => next,
            Some((next_no, next)) => {
                return Err(DownloadError::MalformedPlaylist(format!(
                    "{}: line {} must be the URI for the stream-info tag on line {}, found {:?}",
                    playlist.url,
                    next_no + 1,
                    line_no + 1,
                    next
                )));
            }
            None => {
                return Err(DownloadError::MalformedPlaylist(format!(
                    "{}: stream-info tag on line {} has no URI line",
                    playlist.url,
                    line_no + 1
                )));
            }
        };

        let Some(bandwidth) = parse_bandwidth(line) else {
            warn!(
                playlist = %playlist.url,
                line = line_no + 1,
                "Skipping variant without a usable BANDWIDTH attribute"
            );
            continue;
        };

        // the first usable variant is taken even at BANDWIDTH=0
        if selected.as_ref().is_none_or(|v| bandwidth > v.bandwidth) {
            selected = Some(Variant {
                bandwidth,
                uri: resolve(uri, &playlist.url),
            });
        }
    }

    selected.ok_or_else(|| DownloadError::NoVariantFound(playlist.url.clone()))
}

/// Every non-empty line that is not a tag or comment is a segment URI, in
/// playback order.
pub fn extract_segments(playlist: &Playlist) -> Vec<Segment> {
    playlist
        .content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(index, uri)| Segment::new(index, resolve(uri, &playlist.url)))
        .collect()
}

/// Follows master playlists until a media playlist is reached.
pub struct PlaylistEngine {
    transport: Arc<dyn Transport>,
    max_variant_depth: usize,
}

impl PlaylistEngine {
    pub fn new(transport: Arc<dyn Transport>, max_variant_depth: usize) -> Self {
        Self {
            transport,
            max_variant_depth,
        }
    }

    pub async fn fetch_playlist(&self, url: &str) -> Result<Playlist, DownloadError> {
        let content = self.transport.fetch_text(url).await?;
        debug!(url = %url, bytes = content.len(), "Fetched playlist");
        Ok(Playlist::new(url, content))
    }

    /// Resolves `url` down to a media playlist and extracts its segments.
    ///
    /// At most `max_variant_depth` master playlists are followed; a longer
    /// (or cyclic) chain is reported as a malformed playlist.
    pub async fn resolve_media_playlist(&self, url: &str) -> Result<MediaPlaylist, DownloadError> {
        let mut current_url = url.to_string();
        let mut masters_followed = 0;

        loop {
            let playlist = self.fetch_playlist(&current_url).await?;

            match playlist.kind() {
                PlaylistKind::Media => {
                    let segments = extract_segments(&playlist);
                    info!(
                        url = %playlist.url,
                        segments = segments.len(),
                        "Resolved media playlist"
                    );
                    return Ok(MediaPlaylist {
                        url: playlist.url,
                        segments,
                    });
                }
                PlaylistKind::Master => {
                    if masters_followed == self.max_variant_depth {
                        return Err(DownloadError::MalformedPlaylist(format!(
                            "variant chain starting at {url} exceeds {} master playlists",
                            self.max_variant_depth
                        )));
                    }
                    masters_followed += 1;

                    let variant = select_variant(&playlist)?;
                    info!(
                        master = %playlist.url,
                        variant = %variant.uri,
                        bandwidth = variant.bandwidth,
                        "Selected variant"
                    );
                    current_url = variant.uri;
                }
            }
        }
    }
}
