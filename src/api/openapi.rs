//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// This struct is used to generate the OpenAPI 3.1 specification that describes
/// all available endpoints, request/response types, and API behavior.
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "OpenAPI 3.1 compliant REST API for registering media download requests and tracking their lifecycle",
        contact(
            name = "media-dl",
            url = "https://github.com/media-dl/media-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8093/api/v1", description = "Local development server")
    ),
    paths(
        // Download Requests
        crate::api::routes::list_download_requests,
        crate::api::routes::get_download_request,
        crate::api::routes::create_download_request,
        crate::api::routes::delete_download_request,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::api::dto::DownloadRequestDto,
        crate::api::dto::VideoDto,
        crate::api::routes::CreateDownloadRequest,
        crate::api::routes::MessageResponse,
        crate::error::ApiError,
        crate::error::ErrorDetail,
        crate::types::RequestId,
        crate::types::Status,
        crate::types::Event,
    )),
    tags(
        (name = "download-requests", description = "Download request lifecycle"),
        (name = "system", description = "Health, events, and API metadata")
    )
)]
pub struct ApiDoc;
