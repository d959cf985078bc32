//! Storyweave API server entry point.

use std::error::Error;

use storyweave_api::config::ServerConfig;
use storyweave_api::state::AppState;
use storyweave_api::{build_router, observability};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let tracer_provider = observability::init("storyweave-api")?;

    tracing::info!("Starting Storyweave API server");

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;

    let app = build_router(AppState::in_memory(), &config.static_root);

    tracing::info!(static_root = %config.static_root.display(), "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(provider) = tracer_provider {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "failed to flush spans");
        }
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
