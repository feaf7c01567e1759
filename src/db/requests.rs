//! Download request CRUD, soft delete, and insert subscription.

use crate::error::DatabaseError;
use crate::types::{DownloadRequest, RequestId, Status};
use crate::{Error, Result};
use tokio::sync::broadcast;

use super::{CompletedFields, Database, NewRequest, RequestRow};

const REQUEST_COLUMNS: &str = r#"
    id, url, title, status, image_url, videos,
    is_playlist, playlist_count, downloaded_count,
    deleted, deleted_at, created_at, updated_at
"#;

impl Database {
    /// Insert a new download request with status Registered
    ///
    /// Publishes the inserted entity on the insert-notification channel.
    /// The server-side filter (status = Registered, deleted = false) is
    /// applied at publish time, so subscribers only ever observe matching
    /// inserts.
    pub async fn insert_request(&self, request: &NewRequest) -> Result<DownloadRequest> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO download_requests (
                url, status, videos, is_playlist, deleted, created_at, updated_at
            ) VALUES (?, ?, '[]', 0, 0, ?, ?)
            "#,
        )
        .bind(&request.url)
        .bind(Status::Registered.to_i32())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert download request: {}",
                e
            )))
        })?;

        let id = RequestId(result.last_insert_rowid());

        let entity = self.get_request(id, false).await?.ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "download request {} vanished after insert",
                id
            )))
        })?;

        if entity.status == Status::Registered && !entity.deleted {
            // send() fails only when no subscriber exists, which is fine -
            // the worker catches up from a status scan at startup anyway
            self.insert_tx.send(entity.clone()).ok();
        }

        Ok(entity)
    }

    /// Get a download request by ID
    ///
    /// Soft-deleted requests are only returned when `include_deleted` is true.
    pub async fn get_request(
        &self,
        id: RequestId,
        include_deleted: bool,
    ) -> Result<Option<DownloadRequest>> {
        let sql = if include_deleted {
            format!(
                "SELECT {} FROM download_requests WHERE id = ?",
                REQUEST_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM download_requests WHERE id = ? AND deleted = 0",
                REQUEST_COLUMNS
            )
        };

        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to get download request: {}",
                    e
                )))
            })?;

        row.map(RequestRow::into_request).transpose()
    }

    /// List all download requests, oldest first
    ///
    /// Soft-deleted requests are only included when `include_deleted` is true.
    pub async fn list_requests(&self, include_deleted: bool) -> Result<Vec<DownloadRequest>> {
        let sql = if include_deleted {
            format!(
                "SELECT {} FROM download_requests ORDER BY created_at ASC, id ASC",
                REQUEST_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM download_requests WHERE deleted = 0 ORDER BY created_at ASC, id ASC",
                REQUEST_COLUMNS
            )
        };

        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list download requests: {}",
                    e
                )))
            })?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    /// List non-deleted requests with a specific status, oldest first
    ///
    /// Used by the worker's startup catch-up scan.
    pub async fn list_requests_by_status(&self, status: Status) -> Result<Vec<DownloadRequest>> {
        let sql = format!(
            "SELECT {} FROM download_requests WHERE status = ? AND deleted = 0 ORDER BY created_at ASC, id ASC",
            REQUEST_COLUMNS
        );

        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(status.to_i32())
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list download requests by status: {}",
                    e
                )))
            })?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    /// Update the request status
    ///
    /// Exactly one status-changing update per lifecycle transition; refreshes
    /// `updated_at`.
    pub async fn update_status(&self, id: RequestId, status: Status) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("UPDATE download_requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_i32())
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update status: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Record a completed extraction
    ///
    /// Writes status = Completed together with all derived fields in a single
    /// update call.
    pub async fn complete_request(&self, id: RequestId, fields: &CompletedFields) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let videos = serde_json::to_string(&fields.videos)?;

        sqlx::query(
            r#"
            UPDATE download_requests
            SET status = ?, title = ?, image_url = ?, videos = ?,
                is_playlist = ?, playlist_count = ?, downloaded_count = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Status::Completed.to_i32())
        .bind(&fields.title)
        .bind(&fields.image_url)
        .bind(videos)
        .bind(fields.is_playlist as i32)
        .bind(fields.playlist_count.map(|n| n as i64))
        .bind(fields.downloaded_count.map(|n| n as i64))
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to record completed extraction: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Soft-delete a download request
    ///
    /// Sets the deleted flag and deletion timestamp; the row is retained.
    /// Returns false when the id is absent or already soft-deleted.
    pub async fn soft_delete_request(&self, id: RequestId) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE download_requests
            SET deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ? AND deleted = 0
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to soft-delete download request: {}",
                e
            )))
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Subscribe to insert notifications
    ///
    /// Yields every newly inserted request matching the server-side filter
    /// (status = Registered, deleted = false), in insertion order. The stream
    /// is infinite and not restartable: notifications sent before the
    /// subscription existed are never replayed, and a subscriber that lags
    /// behind the channel capacity observes a lag error instead of the
    /// dropped inserts.
    pub fn subscribe_inserts(&self) -> broadcast::Receiver<DownloadRequest> {
        self.insert_tx.subscribe()
    }
}
