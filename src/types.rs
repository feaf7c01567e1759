//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a download request
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl RequestId {
    /// Create a new RequestId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RequestId> for i64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for RequestId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for RequestId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for RequestId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Download request lifecycle status
///
/// Transitions are one-directional: `Registered -> InProgress -> {Completed | Failed}`.
/// Completed and Failed are terminal; there is no retry path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Registered by a client, waiting for the worker to pick it up
    Registered,
    /// Picked up by the worker, extraction in flight
    InProgress,
    /// Extraction finished, videos and metadata recorded
    Completed,
    /// Extraction raised an error
    Failed,
}

impl Status {
    /// Convert integer status code to Status enum
    pub fn from_i32(status: i32) -> Self {
        match status {
            0 => Status::Registered,
            1 => Status::InProgress,
            2 => Status::Completed,
            3 => Status::Failed,
            _ => Status::Failed, // Default to Failed for unknown status
        }
    }

    /// Convert Status enum to integer status code
    pub fn to_i32(&self) -> i32 {
        match self {
            Status::Registered => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
            Status::Failed => 3,
        }
    }

    /// Whether the status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

/// A single downloaded media item, owned exclusively by its parent request
///
/// Persisted as part of the request document (JSON column), never shared
/// across requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Video {
    /// The extraction capability's identifier for this media item
    pub id: String,

    /// Media title ("Unknown" when the extractor reports none)
    pub title: String,

    /// Absolute location of the downloaded file
    pub path: PathBuf,

    /// Thumbnail reference (empty string when the extractor reports none)
    #[serde(default)]
    pub image_url: String,

    /// Duration in seconds (0 when unknown)
    #[serde(default)]
    pub duration: u32,
}

/// A download request tracked through its processing lifecycle
///
/// Created by [`crate::MediaDownloader::create_request`] with status
/// [`Status::Registered`]; mutated exclusively by the lifecycle engine
/// thereafter, and by soft delete. Never hard-deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Unique request identifier, assigned at creation, immutable
    pub id: RequestId,

    /// Source locator, set once at creation
    pub url: String,

    /// Human-readable name; absent until extraction completes
    pub title: Option<String>,

    /// Current lifecycle status
    pub status: Status,

    /// Thumbnail reference; absent until extraction completes
    pub image_url: Option<String>,

    /// Downloaded media items (empty until completion)
    pub videos: Vec<Video>,

    /// Whether the URL resolved to a playlist; immutable once set by the worker
    pub is_playlist: bool,

    /// Total entries discovered in the playlist (present iff `is_playlist`)
    pub playlist_count: Option<u32>,

    /// Entries actually downloaded (present iff `is_playlist`)
    pub downloaded_count: Option<u32>,

    /// Soft-delete marker; deleted requests are excluded from default reads
    pub deleted: bool,

    /// When the request was soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the request was created
    pub created_at: DateTime<Utc>,

    /// Refreshed on every insert or update
    pub updated_at: DateTime<Utc>,
}

/// Event emitted during the request lifecycle
///
/// Consumers subscribe via [`crate::MediaDownloader::subscribe`]; the REST
/// API relays these over the `/events` SSE endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Request registered by a client
    Registered {
        /// Request ID
        id: RequestId,
        /// Source URL
        url: String,
    },

    /// Worker picked the request up; extraction started
    Started {
        /// Request ID
        id: RequestId,
    },

    /// Extraction finished and results were recorded
    Completed {
        /// Request ID
        id: RequestId,
        /// Number of videos produced
        videos: usize,
    },

    /// Extraction raised an error; the request is terminal
    Failed {
        /// Request ID
        id: RequestId,
        /// Error message (logged, never persisted on the entity)
        error: String,
    },

    /// Request soft-deleted
    Removed {
        /// Request ID
        id: RequestId,
    },

    /// Graceful shutdown initiated
    Shutdown,
}
