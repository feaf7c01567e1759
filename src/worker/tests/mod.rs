use crate::db::{Database, NewRequest};
use crate::extractor::MediaExtractor;
use crate::test_util::StubExtractor;
use crate::types::{DownloadRequest, Event};
use crate::worker::DownloadWorker;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

mod lifecycle;

/// Worker wired to a fresh scratch database and a stub extractor
async fn make_worker(
    extractor: StubExtractor,
) -> (
    Arc<DownloadWorker>,
    Arc<Database>,
    broadcast::Receiver<Event>,
    TempDir,
) {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(
        Database::new(&temp_dir.path().join("test.db"))
            .await
            .unwrap(),
    );
    let (event_tx, event_rx) = broadcast::channel(64);

    let worker = Arc::new(DownloadWorker::new(
        Arc::clone(&db),
        Arc::new(extractor) as Arc<dyn MediaExtractor>,
        event_tx,
        temp_dir.path().join("downloads"),
        2,
        CancellationToken::new(),
    ));

    (worker, db, event_rx, temp_dir)
}

async fn insert(db: &Database, url: &str) -> DownloadRequest {
    db.insert_request(&NewRequest {
        url: url.to_string(),
    })
    .await
    .unwrap()
}

fn downloads_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("downloads")
}
