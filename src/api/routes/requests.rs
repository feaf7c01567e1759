//! Download request management handlers.

use super::{CreateDownloadRequest, MessageResponse};
use crate::api::AppState;
use crate::api::dto::DownloadRequestDto;
use crate::types::RequestId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /download-requests - List all download requests
#[utoipa::path(
    get,
    path = "/api/v1/download-requests",
    tag = "download-requests",
    responses(
        (status = 200, description = "List of all download requests", body = Vec<DownloadRequestDto>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_download_requests(State(state): State<AppState>) -> Response {
    match state.downloader.list_requests().await {
        Ok(requests) => {
            (StatusCode::OK, Json(DownloadRequestDto::from_entities(requests))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list download requests");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"code": "internal_error", "message": "internal server error"}})),
            )
                .into_response()
        }
    }
}

/// GET /download-requests/:id - Get single download request
#[utoipa::path(
    get,
    path = "/api/v1/download-requests/{id}",
    tag = "download-requests",
    params(
        ("id" = i64, Path, description = "Download request ID")
    ),
    responses(
        (status = 200, description = "Download request", body = DownloadRequestDto),
        (status = 404, description = "Download request not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_download_request(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.downloader.get_request(RequestId(id)).await {
        Ok(Some(request)) => {
            (StatusCode::OK, Json(DownloadRequestDto::from_entity(request))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": "not_found", "message": format!("Download request {} not found", id)}})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(request_id = id, error = %e, "Failed to get download request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"code": "internal_error", "message": "internal server error"}})),
            )
                .into_response()
        }
    }
}

/// POST /download-requests - Register a URL for download
#[utoipa::path(
    post,
    path = "/api/v1/download-requests",
    tag = "download-requests",
    request_body = CreateDownloadRequest,
    responses(
        (status = 201, description = "Download request registered", body = DownloadRequestDto),
        (status = 400, description = "Malformed URL"),
        (status = 503, description = "Shutting down"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_download_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateDownloadRequest>,
) -> Response {
    match state.downloader.create_request(&payload.url).await {
        Ok(request) => (
            StatusCode::CREATED,
            Json(DownloadRequestDto::from_entity(request)),
        )
            .into_response(),
        Err(crate::Error::InvalidUrl(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": "invalid_url", "message": format!("Invalid URL format: {}", msg)}})),
        )
            .into_response(),
        Err(crate::Error::ShuttingDown) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": {"code": "shutting_down", "message": "not accepting new requests"}})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(url = %payload.url, error = %e, "Failed to create download request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"code": "internal_error", "message": "internal server error"}})),
            )
                .into_response()
        }
    }
}

/// DELETE /download-requests/:id - Soft-delete a download request
#[utoipa::path(
    delete,
    path = "/api/v1/download-requests/{id}",
    tag = "download-requests",
    params(
        ("id" = i64, Path, description = "Download request ID")
    ),
    responses(
        (status = 200, description = "Download request deleted", body = MessageResponse),
        (status = 404, description = "Download request not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_download_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    match state.downloader.delete_request(RequestId(id)).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: format!("Download request {} deleted successfully", id),
            }),
        )
            .into_response(),
        Err(crate::Error::NotFound(msg)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": "not_found", "message": msg}})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(request_id = id, error = %e, "Failed to delete download request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"code": "internal_error", "message": "internal server error"}})),
            )
                .into_response()
        }
    }
}
