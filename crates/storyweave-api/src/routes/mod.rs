//! Route modules, one per endpoint group.

use axum::Router;
use axum::extract::OriginalUri;
use axum::routing::post;

use crate::error::ApiError;
use crate::state::AppState;

pub mod health;
pub mod rewards;
pub mod session;
pub mod story;

/// Routes mounted under `/api`. Unknown API paths answer with a JSON 404
/// instead of falling through to static files.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/session", post(session::start_session))
        .nest("/story", story::router())
        .nest("/rewards", rewards::router())
        .fallback(api_not_found)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_owned())
}
