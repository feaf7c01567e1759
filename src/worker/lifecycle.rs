//! Per-request lifecycle transitions.

use super::DownloadWorker;
use super::merge::merge_extraction;
use crate::error::Result;
use crate::types::{DownloadRequest, Event, Status};

impl DownloadWorker {
    /// Walk one request through its lifecycle
    ///
    /// `Registered -> InProgress` is persisted before any extraction work
    /// begins, so a crash mid-download leaves the request visibly stuck in
    /// progress rather than silently re-queued. The terminal transition
    /// writes exactly one further update: either status plus all derived
    /// fields (Completed) or status alone (Failed).
    ///
    /// Extraction errors are fully contained here; the returned error covers
    /// only store failures.
    pub(crate) async fn process(&self, request: DownloadRequest) -> Result<()> {
        let id = request.id;

        self.db.update_status(id, Status::InProgress).await?;
        self.emit_event(Event::Started { id });
        tracing::info!(request_id = id.0, url = %request.url, "processing download request");

        match self.extractor.extract(&request.url, id).await {
            Ok(extraction) => {
                let fields = merge_extraction(id, extraction, &self.download_dir);

                // A completed request must carry at least one video; a
                // playlist whose entries were all unavailable is a failure
                if fields.videos.is_empty() {
                    tracing::error!(
                        request_id = id.0,
                        url = %request.url,
                        "extraction produced no downloadable media"
                    );
                    self.db.update_status(id, Status::Failed).await?;
                    self.emit_event(Event::Failed {
                        id,
                        error: "no downloadable media".to_string(),
                    });
                    return Ok(());
                }

                let videos = fields.videos.len();
                self.db.complete_request(id, &fields).await?;
                self.emit_event(Event::Completed { id, videos });
                tracing::info!(
                    request_id = id.0,
                    videos,
                    title = %fields.title,
                    "download request completed"
                );
            }
            Err(e) => {
                // The error detail is logged only - never persisted on the
                // entity, never retried
                tracing::error!(request_id = id.0, url = %request.url, error = %e, "extraction failed");
                self.db.update_status(id, Status::Failed).await?;
                self.emit_event(Event::Failed {
                    id,
                    error: e.to_string(),
                });
            }
        }

        Ok(())
    }
}
