//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storyweave_api::build_router;
use storyweave_api::state::AppState;
use storyweave_telemetry::application::store::InMemorySessionStore;
use storyweave_test_support::{FixedClock, fixtures};
use tower::ServiceExt;

/// A throwaway static root holding `index.html`, `story.json` and a reward
/// file. Removed on drop.
pub struct StaticRoot {
    path: PathBuf,
}

impl StaticRoot {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("storyweave-api-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(path.join("rewards")).unwrap();
        std::fs::write(
            path.join("index.html"),
            "<!doctype html><title>Storyweave</title>",
        )
        .unwrap();
        std::fs::write(path.join("story.json"), fixtures::linear_story()).unwrap();
        std::fs::write(path.join("rewards/letter.txt"), "Dear reader,").unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StaticRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// State with a fixed clock, a seeded RNG and an empty in-memory store.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(FixedClock::at_test_epoch()),
        Arc::new(Mutex::new(StdRng::seed_from_u64(42))),
        Arc::new(InMemorySessionStore::new()),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState, root: &StaticRoot) -> Router {
    build_router(state, root.path())
}

/// Serve the full app on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(state: AppState, root: &StaticRoot) -> String {
    let app = build_test_app(state, root);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Send a POST request with a raw body and return the response.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, &body.to_string()).await
}

/// Send a GET request and return the JSON response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, text) = get_text(app, uri).await;
    (status, serde_json::from_str(&text).unwrap())
}

/// Send a GET request and return the body as text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}
