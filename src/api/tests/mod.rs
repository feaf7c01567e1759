use crate::api::create_router;
use crate::service::MediaDownloader;
use crate::test_util::{StubExtractor, create_test_downloader, sample_meta};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot()


/// Router plus the downloader it serves, backed by scratch storage
async fn test_app(extractor: StubExtractor) -> (Router, Arc<MediaDownloader>, TempDir) {
    let (downloader, temp_dir) = create_test_downloader(extractor).await;
    let config = downloader.get_config();
    let app = create_router(Arc::clone(&downloader), config);
    (app, downloader, temp_dir)
}

/// Default app with a single-video stub
async fn default_app() -> (Router, Arc<MediaDownloader>, TempDir) {
    test_app(StubExtractor::single(sample_meta("abc", "T"))).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).expect("response should be valid JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
