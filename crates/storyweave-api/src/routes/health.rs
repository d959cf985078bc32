//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the session store cannot be read.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Sessions started since boot, when the store answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sessions: Option<u64>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, total_sessions) = match state.store.stats().await {
        Ok(stats) => ("ok", Some(stats.total_sessions)),
        Err(err) => {
            warn!(error = %err, "session store unavailable");
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        total_sessions,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
