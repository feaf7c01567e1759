//! External representations of download requests
//!
//! Field naming and shaping here is a presentation concern: entities are
//! mapped into DTOs at the API boundary and never exposed directly.

use crate::types::{DownloadRequest, RequestId, Status, Video};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// External representation of a download request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequestDto {
    /// Request identifier
    pub id: RequestId,

    /// Source URL
    pub url: String,

    /// Lifecycle status ("registered", "in_progress", "completed", "failed")
    pub status: Status,

    /// Title, present once extraction completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Thumbnail reference, present once extraction completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Whether the URL resolved to a playlist
    pub is_playlist: bool,

    /// Total playlist entries discovered (playlists only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_count: Option<u32>,

    /// Entries actually downloaded (playlists only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded_count: Option<u32>,

    /// Downloaded media items (empty until completion)
    pub videos: Vec<VideoDto>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// External representation of a downloaded media item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoDto {
    /// The extraction capability's identifier for this media item
    pub id: String,

    /// Media title
    pub title: String,

    /// Location of the downloaded file
    pub path: PathBuf,

    /// Thumbnail reference (empty when unknown)
    pub image_url: String,

    /// Duration in seconds (0 when unknown)
    pub duration: u32,
}

impl DownloadRequestDto {
    /// Map an entity into its external representation
    pub fn from_entity(entity: DownloadRequest) -> Self {
        Self {
            id: entity.id,
            url: entity.url,
            status: entity.status,
            title: entity.title,
            image_url: entity.image_url,
            is_playlist: entity.is_playlist,
            playlist_count: entity.playlist_count,
            downloaded_count: entity.downloaded_count,
            videos: entity.videos.into_iter().map(VideoDto::from_entity).collect(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    /// Map a batch of entities, preserving order
    pub fn from_entities(entities: Vec<DownloadRequest>) -> Vec<Self> {
        entities.into_iter().map(Self::from_entity).collect()
    }
}

impl VideoDto {
    /// Map a video value object into its external representation
    pub fn from_entity(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            path: video.path,
            image_url: video.image_url,
            duration: video.duration,
        }
    }
}
