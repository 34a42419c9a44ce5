//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The upload endpoint consumed by the dashboard UI
//! - A health check route
//!
//! Authentication is the session layer's concern and sits in front of this
//! router in deployment; an unauthenticated caller never reaches the
//! pipeline.

pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vitrine_core::asset::MediaService;

/// Multipart uploads are capped at 25 MB; product photos are far smaller
/// once clients are done with them.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Asset lifecycle manager.
    pub media: Arc<MediaService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
