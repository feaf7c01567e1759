//! Change-notification dispatch loop.

use super::DownloadWorker;
use crate::error::{Error, Result};
use crate::types::{DownloadRequest, Status};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

impl DownloadWorker {
    /// Run the dispatch loop until cancelled
    ///
    /// Subscribes to the store's insert-notification stream, then performs a
    /// catch-up scan of requests still in Registered state (work registered
    /// while no worker was running), then consumes notifications one at a
    /// time in insertion order.
    ///
    /// Extraction failures are contained inside per-request processing and
    /// never reach this loop. Stream failures (closure, dropped
    /// notifications) are infrastructure errors: they terminate the loop
    /// with an error and the process supervisor is the recovery mechanism.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        // Subscribe before the scan so an insert racing the scan is seen on
        // the stream rather than dropped. The same request may then be
        // observed twice; pickup is at-least-once, never exactly-once.
        let receiver = self.db.subscribe_inserts();
        let mut stream = BroadcastStream::new(receiver);

        let backlog = self.db.list_requests_by_status(Status::Registered).await?;
        if !backlog.is_empty() {
            tracing::info!(
                count = backlog.len(),
                "picking up registered requests from a previous session"
            );
        }
        for request in backlog {
            self.dispatch(request).await?;
        }

        tracing::info!(extractor = self.extractor.name(), "download worker listening for new requests");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("download worker stopped");
                    return Ok(());
                }
                next = stream.next() => match next {
                    Some(Ok(request)) => {
                        self.dispatch(request).await?;
                    }
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        // A lagged subscriber has silently lost inserts; there
                        // is no resume token to replay them from
                        return Err(Error::InsertStream(format!(
                            "{} insert notifications dropped",
                            skipped
                        )));
                    }
                    None => {
                        return Err(Error::InsertStream("insert stream closed".to_string()));
                    }
                },
            }
        }
    }

    /// Hand one request to the lifecycle engine on a spawned task
    ///
    /// Blocks until a worker slot is free, keeping the number of in-flight
    /// extractions bounded while notifications queue up in the stream.
    async fn dispatch(self: &Arc<Self>, request: DownloadRequest) -> Result<()> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| Error::ShuttingDown)?;

        let worker = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = permit;
            let id = request.id;
            if let Err(e) = worker.process(request).await {
                tracing::error!(request_id = id.0, error = %e, "request processing failed");
            }
        });

        Ok(())
    }
}
