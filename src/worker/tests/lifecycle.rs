use super::*;
use crate::extractor::PlaylistMeta;
use crate::test_util::sample_meta;
use crate::types::Status;

#[tokio::test]
async fn successful_single_video_reaches_completed_with_derived_fields() {
    let (worker, db, _events, temp_dir) = make_worker(StubExtractor::single(sample_meta("abc", "T"))).await;

    let request = insert(&db, "https://example.com/video.mp4").await;
    worker.process(request.clone()).await.unwrap();

    let reloaded = db.get_request(request.id, false).await.unwrap().unwrap();
    assert_eq!(reloaded.status, Status::Completed);
    assert_eq!(reloaded.title.as_deref(), Some("T"));
    assert!(!reloaded.is_playlist);
    assert!(reloaded.playlist_count.is_none());
    assert!(reloaded.downloaded_count.is_none());

    assert_eq!(reloaded.videos.len(), 1);
    let video = &reloaded.videos[0];
    assert_eq!(video.id, "abc");
    assert_eq!(video.title, "T");
    assert_eq!(video.duration, 10);
    assert_eq!(
        video.path,
        downloads_dir(&temp_dir).join(format!("{}_abc.mp4", request.id))
    );
}

#[tokio::test]
async fn failed_extraction_reaches_failed_with_no_derived_fields() {
    let (worker, db, _events, _temp_dir) =
        make_worker(StubExtractor::failing("connection reset")).await;

    let request = insert(&db, "https://example.com/video.mp4").await;
    worker.process(request.clone()).await.unwrap();

    let reloaded = db.get_request(request.id, false).await.unwrap().unwrap();
    assert_eq!(reloaded.status, Status::Failed);
    assert!(
        reloaded.title.is_none() && reloaded.image_url.is_none() && reloaded.videos.is_empty(),
        "failed requests must carry no partial result fields"
    );
    assert!(!reloaded.is_playlist);
}

#[tokio::test]
async fn playlist_extraction_records_counts_and_entry_order() {
    let playlist = PlaylistMeta {
        title: Some("My Playlist".to_string()),
        thumbnail: Some("https://example.com/cover.jpg".to_string()),
        entries: vec![
            None,
            Some(sample_meta("v1", "A")),
            Some(sample_meta("v2", "B")),
        ],
    };
    let (worker, db, _events, _temp_dir) = make_worker(StubExtractor::playlist(playlist)).await;

    let request = insert(&db, "https://example.com/playlist?list=PL1").await;
    worker.process(request.clone()).await.unwrap();

    let reloaded = db.get_request(request.id, false).await.unwrap().unwrap();
    assert_eq!(reloaded.status, Status::Completed);
    assert!(reloaded.is_playlist);
    assert_eq!(reloaded.playlist_count, Some(2));
    assert_eq!(reloaded.downloaded_count, Some(2));
    assert_eq!(reloaded.title.as_deref(), Some("My Playlist"));

    assert_eq!(reloaded.videos.len(), 2);
    assert_eq!(reloaded.videos[0].id, "v1");
    assert_eq!(reloaded.videos[1].id, "v2");
}

#[tokio::test]
async fn playlist_with_only_null_entries_fails() {
    let playlist = PlaylistMeta {
        title: Some("Empty".to_string()),
        thumbnail: None,
        entries: vec![None, None],
    };
    let (worker, db, _events, _temp_dir) = make_worker(StubExtractor::playlist(playlist)).await;

    let request = insert(&db, "https://example.com/playlist?list=PL2").await;
    worker.process(request.clone()).await.unwrap();

    let reloaded = db.get_request(request.id, false).await.unwrap().unwrap();
    assert_eq!(
        reloaded.status,
        Status::Failed,
        "a completed request must carry videos, so zero produced entries is a failure"
    );
    assert!(reloaded.videos.is_empty());
    assert!(reloaded.title.is_none());
}

#[tokio::test]
async fn process_emits_started_then_completed_events() {
    let (worker, db, mut events, _temp_dir) =
        make_worker(StubExtractor::single(sample_meta("abc", "T"))).await;

    let request = insert(&db, "https://example.com/video.mp4").await;
    worker.process(request.clone()).await.unwrap();

    match events.recv().await.unwrap() {
        Event::Started { id } => assert_eq!(id, request.id),
        other => panic!("expected Started, got {:?}", other),
    }
    match events.recv().await.unwrap() {
        Event::Completed { id, videos } => {
            assert_eq!(id, request.id);
            assert_eq!(videos, 1);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
}

#[tokio::test]
async fn process_emits_failed_event_with_error_detail() {
    let (worker, db, mut events, _temp_dir) =
        make_worker(StubExtractor::failing("HTTP 403")).await;

    let request = insert(&db, "https://example.com/video.mp4").await;
    worker.process(request.clone()).await.unwrap();

    // Skip Started
    events.recv().await.unwrap();
    match events.recv().await.unwrap() {
        Event::Failed { id, error } => {
            assert_eq!(id, request.id);
            assert!(error.contains("HTTP 403"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}
