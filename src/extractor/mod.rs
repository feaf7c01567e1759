//! Media extraction capability
//!
//! The extraction capability is external and opaque: given a URL, it
//! produces either single-media metadata or playlist metadata, and
//! materializes the downloaded files at deterministic paths. The concrete
//! implementation ([`YtDlpExtractor`]) shells out to the yt-dlp binary;
//! embedders can supply their own [`MediaExtractor`] implementation.

use crate::error::Result;
use crate::types::RequestId;
use async_trait::async_trait;

mod ytdlp;

pub use ytdlp::YtDlpExtractor;

/// Metadata for a single media item as reported by the extraction capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMeta {
    /// The capability's identifier for this media item
    pub id: String,
    /// Media title, when reported
    pub title: Option<String>,
    /// Thumbnail URL, when reported
    pub thumbnail: Option<String>,
    /// Duration in seconds, when reported
    pub duration: Option<u32>,
    /// File extension of the materialized download
    pub ext: String,
}

/// Metadata for a playlist as reported by the extraction capability
///
/// Entries may be absent (`None`): extraction backends report unavailable
/// playlist members as null slots, which callers filter out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMeta {
    /// Playlist title, when reported
    pub title: Option<String>,
    /// Playlist thumbnail URL, when reported
    pub thumbnail: Option<String>,
    /// Playlist members, in playlist order; null slots for unavailable entries
    pub entries: Vec<Option<MediaMeta>>,
}

/// Raw extraction result: one media item or a playlist of them
///
/// A tagged variant rather than a duck-typed payload: each case carries its
/// own shape, and `Playlist` is chosen exactly when the backend exposes a
/// list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The URL resolved to a single media item
    Single(MediaMeta),
    /// The URL resolved to a playlist
    Playlist(PlaylistMeta),
}

/// External capability that inspects a URL and performs the media retrieval
///
/// Implementations download the referenced media to
/// `<download_dir>/<request_id>_<media_id>.<ext>` and return the raw
/// metadata. Any network/parsing/unsupported-URL failure is reported as a
/// generic [`crate::Error::Extraction`]; no structured error taxonomy is
/// exposed.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Extract and download the media behind `url` for the given request
    async fn extract(&self, url: &str, request_id: RequestId) -> Result<Extraction>;

    /// Name of the extractor implementation, for logging
    fn name(&self) -> &str;
}
