//! HTTP surface of the gateway.
//!
//! `POST /api` carries Transit batches, `POST /file-upload` and
//! `POST /file-uploads` accept files ahead of an upload mutation and
//! everything else serves the single-page client. Client-side routes all resolve to `index.html`.

mod api;
mod assets;
mod errors;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::uploads::UploadStore;

pub use errors::TransportError;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Content type of every batch response.
pub const TRANSIT_CONTENT_TYPE: &str = "application/transit+json";

const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Shared state handed to every request.
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// Batch executor.
    pub dispatcher: Arc<Dispatcher>,
    /// Scratch storage for uploads.
    pub uploads: Arc<UploadStore>,
}

/// Builds the complete router, static assets included.
pub fn router(state: GatewayState, assets_dir: &std::path::Path) -> Router {
    let routes = Router::new()
        .route("/api", post(api::batch))
        .route(
            "/file-upload",
            post(api::file_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/file-uploads",
            post(api::file_uploads).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/ping", get(api::ping))
        .with_state(state);
    assets::mount(routes, assets_dir).layer(TraceLayer::new_for_http())
}
