//! Database layer for media-dl
//!
//! Handles SQLite persistence for download requests and exposes the
//! insert-notification primitive the worker subscribes to.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`requests`] — Download request CRUD, soft delete, insert subscription
//!
//! ## Soft delete
//!
//! Every read operation takes an explicit `include_deleted` flag. Callers
//! default to `false`; a soft-deleted request only surfaces through an
//! audit read that passes `true`. Data is retained, never physically removed.

use crate::error::Result;
use crate::types::{DownloadRequest, RequestId, Status, Video};
use chrono::{TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};
use tokio::sync::broadcast;

mod migrations;
mod requests;

/// Capacity of the insert-notification broadcast channel
///
/// A subscriber that falls further behind than this loses notifications
/// (surfaced as a lag error, treated as fatal by the worker).
const INSERT_CHANNEL_CAPACITY: usize = 256;

/// New download request to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// Source URL to download from
    pub url: String,
}

/// Fields written together when a request completes
///
/// The lifecycle engine persists all of these plus status=Completed in a
/// single update call; there is no partial/incremental persistence of
/// individual videos.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedFields {
    /// Request title (playlist title or the single video's title)
    pub title: String,
    /// Thumbnail reference
    pub image_url: Option<String>,
    /// Downloaded media items
    pub videos: Vec<Video>,
    /// Whether the URL resolved to a playlist
    pub is_playlist: bool,
    /// Total non-null entries discovered (playlists only)
    pub playlist_count: Option<u32>,
    /// Entries actually downloaded (playlists only)
    pub downloaded_count: Option<u32>,
}

/// Download request record from the database
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    /// Unique database ID
    pub id: i64,
    /// Source URL
    pub url: String,
    /// Request title (NULL until completion)
    pub title: Option<String>,
    /// Current status code (see [`Status`])
    pub status: i32,
    /// Thumbnail reference (NULL until completion)
    pub image_url: Option<String>,
    /// Videos as a JSON array
    pub videos: String,
    /// Playlist flag (0 = single, 1 = playlist)
    pub is_playlist: i32,
    /// Total playlist entries (NULL unless playlist)
    pub playlist_count: Option<i64>,
    /// Downloaded playlist entries (NULL unless playlist)
    pub downloaded_count: Option<i64>,
    /// Soft-delete flag (0 = live, 1 = deleted)
    pub deleted: i32,
    /// Unix timestamp of soft deletion
    pub deleted_at: Option<i64>,
    /// Unix timestamp when the request was created
    pub created_at: i64,
    /// Unix timestamp of the last insert or update
    pub updated_at: i64,
}

impl RequestRow {
    /// Reconstruct the domain entity from a raw row
    ///
    /// Fails only if the videos JSON column is corrupt.
    pub fn into_request(self) -> Result<DownloadRequest> {
        let videos: Vec<Video> = serde_json::from_str(&self.videos)?;

        Ok(DownloadRequest {
            id: RequestId(self.id),
            url: self.url,
            title: self.title,
            status: Status::from_i32(self.status),
            image_url: self.image_url,
            videos,
            is_playlist: self.is_playlist != 0,
            playlist_count: self.playlist_count.map(|n| n as u32),
            downloaded_count: self.downloaded_count.map(|n| n as u32),
            deleted: self.deleted != 0,
            deleted_at: self.deleted_at.and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
            created_at: Utc
                .timestamp_opt(self.created_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
            updated_at: Utc
                .timestamp_opt(self.updated_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }
}

/// Database handle for media-dl
///
/// Owns the connection pool and the insert-notification channel. Constructed
/// once at startup and passed (Arc-wrapped) to every component that needs it;
/// there is no global instance.
pub struct Database {
    pool: SqlitePool,
    insert_tx: broadcast::Sender<DownloadRequest>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
