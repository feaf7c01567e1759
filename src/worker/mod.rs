//! Request lifecycle engine and change-notification dispatch
//!
//! The worker is the only component that mutates a request after creation.
//! It discovers work through the store's insert-notification stream
//! (filtered to newly registered, non-deleted requests), walks each request
//! through the `Registered -> InProgress -> {Completed | Failed}` state
//! machine, and merges extraction results back onto the entity.
//!
//! Submodules:
//! - [`dispatch`] — insert-stream consumption and job offloading
//! - [`lifecycle`] — per-request state transitions
//! - [`merge`] — single-vs-playlist result normalization

mod dispatch;
mod lifecycle;
pub mod merge;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::db::Database;
use crate::extractor::MediaExtractor;
use crate::types::Event;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use tokio_util::sync::CancellationToken;

/// Background worker that processes newly registered download requests
///
/// One worker instance runs per process. The dispatch loop consumes insert
/// notifications one at a time in insertion order; the heavy extraction work
/// is offloaded to spawned tasks gated by a bounded permit pool, so the
/// loop's scheduler is never blocked by network-bound download work.
///
/// No guarantee is made about cross-request completion order once a job is
/// offloaded.
pub struct DownloadWorker {
    pub(crate) db: Arc<Database>,
    pub(crate) extractor: Arc<dyn MediaExtractor>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) download_dir: PathBuf,
    pub(crate) slots: Arc<Semaphore>,
    pub(crate) cancel: CancellationToken,
}

impl DownloadWorker {
    /// Create a new worker
    ///
    /// `worker_slots` bounds how many extractions may be in flight at once;
    /// `cancel` stops the dispatch loop (in-flight extractions are not
    /// interrupted).
    pub fn new(
        db: Arc<Database>,
        extractor: Arc<dyn MediaExtractor>,
        event_tx: broadcast::Sender<Event>,
        download_dir: PathBuf,
        worker_slots: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            db,
            extractor,
            event_tx,
            download_dir,
            slots: Arc::new(Semaphore::new(worker_slots.max(1))),
            cancel,
        }
    }

    /// Emit a lifecycle event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// processing never depends on anyone listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
