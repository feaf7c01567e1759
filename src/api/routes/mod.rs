//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`requests`] — Download request management
//! - [`system`] — Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod requests;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use requests::*;
pub use system::*;

/// Request body for POST /download-requests
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateDownloadRequest {
    /// URL to register for download
    pub url: String,
}

/// Success message returned by DELETE /download-requests/:id
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}
