//! Shared test helpers: stub extraction capability and service construction.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{Extraction, MediaExtractor, MediaMeta, PlaylistMeta};
use crate::service::MediaDownloader;
use crate::types::RequestId;
use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

/// What a [`StubExtractor`] returns for every extract call
pub(crate) enum StubOutcome {
    Single(MediaMeta),
    Playlist(PlaylistMeta),
    Fail(String),
}

/// In-memory extraction capability with a preset outcome
pub(crate) struct StubExtractor {
    outcome: StubOutcome,
}

impl StubExtractor {
    pub(crate) fn single(meta: MediaMeta) -> Self {
        Self {
            outcome: StubOutcome::Single(meta),
        }
    }

    pub(crate) fn playlist(meta: PlaylistMeta) -> Self {
        Self {
            outcome: StubOutcome::Playlist(meta),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            outcome: StubOutcome::Fail(message.to_string()),
        }
    }
}

#[async_trait]
impl MediaExtractor for StubExtractor {
    async fn extract(&self, _url: &str, _request_id: RequestId) -> Result<Extraction> {
        match &self.outcome {
            StubOutcome::Single(meta) => Ok(Extraction::Single(meta.clone())),
            StubOutcome::Playlist(meta) => Ok(Extraction::Playlist(meta.clone())),
            StubOutcome::Fail(message) => Err(Error::Extraction(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Media metadata with the given id/title and mp4 extension
pub(crate) fn sample_meta(id: &str, title: &str) -> MediaMeta {
    MediaMeta {
        id: id.to_string(),
        title: Some(title.to_string()),
        thumbnail: None,
        duration: Some(10),
        ext: "mp4".to_string(),
    }
}

/// Config pointing every path at a scratch directory
pub(crate) fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.worker_slots = 2;
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.api.swagger_ui = false;
    config
}

/// Build a MediaDownloader backed by a stub extractor and scratch storage
pub(crate) async fn create_test_downloader(
    extractor: StubExtractor,
) -> (Arc<MediaDownloader>, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config = test_config(&temp_dir);
    let downloader = MediaDownloader::with_extractor(config, Arc::new(extractor))
        .await
        .expect("failed to construct test downloader");
    (Arc::new(downloader), temp_dir)
}
