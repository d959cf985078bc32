//! Storyweave API — library crate.
//!
//! Hosts the reading-session telemetry endpoints under `/api`, a health
//! check, and serves the story document and reward files from a static
//! root for everything else.

use std::path::Path;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod observability;
pub mod routes;
pub mod state;

/// Builds the full application router.
pub fn build_router(state: state::AppState, static_root: &Path) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_router())
        .fallback_service(ServeDir::new(static_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
