//! Top-level service aggregate wiring the store, worker, and API together.

use crate::api;
use crate::config::Config;
use crate::db::{Database, NewRequest};
use crate::error::{Error, Result};
use crate::extractor::{MediaExtractor, YtDlpExtractor};
use crate::types::{DownloadRequest, Event, RequestId};
use crate::worker::DownloadWorker;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Capacity of the lifecycle event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Constructed once at startup and injected wherever needed; every
/// collaborator (store, extractor, worker, API) receives it or its parts
/// explicitly. There is no global instance.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests and embedders that need audit reads
    pub db: Arc<Database>,
    /// Extraction capability (trait object for pluggable implementations)
    pub(crate) extractor: Arc<dyn MediaExtractor>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Flag to indicate whether new requests are accepted (false during shutdown)
    accepting_new: Arc<AtomicBool>,
    /// Cancellation token propagated to the worker
    cancel: CancellationToken,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// This initializes all core components:
    /// - Creates the download directory
    /// - Opens/creates the SQLite database and runs migrations
    /// - Resolves the yt-dlp binary (explicit path or PATH discovery)
    /// - Sets up the event broadcast channel
    pub async fn new(config: Config) -> Result<Self> {
        let extractor: Arc<dyn MediaExtractor> =
            if let Some(ref path) = config.extractor.ytdlp_path {
                Arc::new(YtDlpExtractor::new(
                    path.clone(),
                    config.download.download_dir.clone(),
                    config.extractor.format.clone(),
                ))
            } else if config.extractor.search_path {
                YtDlpExtractor::from_path(
                    config.download.download_dir.clone(),
                    config.extractor.format.clone(),
                )
                .map(|e| Arc::new(e) as Arc<dyn MediaExtractor>)
                .ok_or_else(|| Error::Config {
                    message: "yt-dlp binary not found in PATH".to_string(),
                    key: Some("ytdlp_path".to_string()),
                })?
            } else {
                return Err(Error::Config {
                    message: "no yt-dlp path configured and PATH search disabled".to_string(),
                    key: Some("ytdlp_path".to_string()),
                });
            };

        Self::with_extractor(config, extractor).await
    }

    /// Create a MediaDownloader with a custom extraction capability
    ///
    /// Lets embedders substitute their own [`MediaExtractor`] implementation
    /// (a different backend, an in-memory stub for tests).
    pub async fn with_extractor(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Result<Self> {
        // Ensure the download directory exists
        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let db = Database::new(&config.persistence.database_path).await?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            extractor = extractor.name(),
            download_dir = %config.download.download_dir.display(),
            "media downloader initialized"
        );

        Ok(Self {
            db: Arc::new(db),
            extractor,
            event_tx,
            config: Arc::new(config),
            accepting_new: Arc::new(AtomicBool::new(true)),
            cancel: CancellationToken::new(),
        })
    }

    /// Register a URL for download
    ///
    /// The URL is validated before anything is persisted; a malformed or
    /// non-http(s) URL is rejected with [`Error::InvalidUrl`] and no entity
    /// is created. On success the request is stored with status Registered
    /// and the worker is notified through the store's insert stream.
    pub async fn create_request(&self, url: &str) -> Result<DownloadRequest> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let entity = self
            .db
            .insert_request(&NewRequest {
                url: url.to_string(),
            })
            .await?;

        self.emit_event(Event::Registered {
            id: entity.id,
            url: entity.url.clone(),
        });
        tracing::info!(request_id = entity.id.0, url = %entity.url, "download request registered");

        Ok(entity)
    }

    /// Get a download request by ID
    ///
    /// Soft-deleted requests are not returned; use
    /// [`Database::get_request`] with `include_deleted` for audit reads.
    pub async fn get_request(&self, id: RequestId) -> Result<Option<DownloadRequest>> {
        self.db.get_request(id, false).await
    }

    /// List all non-deleted download requests, oldest first
    pub async fn list_requests(&self) -> Result<Vec<DownloadRequest>> {
        self.db.list_requests(false).await
    }

    /// Soft-delete a download request
    ///
    /// The record is retained but excluded from all default reads. Returns
    /// [`Error::NotFound`] when the id is absent or already deleted.
    pub async fn delete_request(&self, id: RequestId) -> Result<()> {
        if self.db.soft_delete_request(id).await? {
            self.emit_event(Event::Removed { id });
            tracing::info!(request_id = id.0, "download request soft-deleted");
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "download request {} not found",
                id
            )))
        }
    }

    /// Subscribe to lifecycle events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. A subscriber that falls behind by more than the
    /// channel capacity receives a `RecvError::Lagged` error.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the background worker
    ///
    /// The worker subscribes to insert notifications, catches up on requests
    /// registered while no worker was running, and processes each request
    /// through its lifecycle. The returned handle resolves when the worker
    /// stops: `Ok` after a cancellation via [`shutdown`](Self::shutdown),
    /// `Err` on an infrastructure failure (the restart/recovery decision is
    /// the supervisor's).
    pub fn spawn_worker(&self) -> tokio::task::JoinHandle<Result<()>> {
        let worker = Arc::new(DownloadWorker::new(
            Arc::clone(&self.db),
            Arc::clone(&self.extractor),
            self.event_tx.clone(),
            self.config.download.download_dir.clone(),
            self.config.download.worker_slots,
            self.cancel.child_token(),
        ));

        tokio::spawn(async move { worker.run().await })
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with request processing and listens on
    /// the configured bind address (default: 127.0.0.1:8093).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = Arc::clone(self);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move { api::start_api_server(downloader, config).await })
    }

    /// Gracefully shut down the downloader
    ///
    /// Stops accepting new requests and cancels the worker's dispatch loop.
    /// Extractions already in flight are not interrupted; a request caught
    /// mid-extraction by process exit stays InProgress (there is no resume
    /// path).
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        self.cancel.cancel();
        self.emit_event(Event::Shutdown);

        tracing::info!("graceful shutdown complete");
        Ok(())
    }
}
