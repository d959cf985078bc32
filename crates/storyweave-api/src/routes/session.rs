//! Session start endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use storyweave_telemetry::application::command_handlers;
use storyweave_telemetry::domain::commands::StartSession;
use storyweave_telemetry::wire::{StartSessionRequest, StartSessionResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/session
///
/// An empty body is accepted and starts a session for the default reader.
#[instrument(skip_all)]
pub(crate) async fn start_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let request: StartSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartSessionRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let command = StartSession {
        correlation_id: Uuid::new_v4(),
        player_name: request.player_name,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let session = command_handlers::handle_start_session(
        &command,
        state.clock.as_ref(),
        &*state.rng,
        &*state.store,
    )
    .await?;

    Ok(Json(StartSessionResponse {
        success: true,
        session_id: session.session_id,
        message: "Story session started successfully".to_owned(),
    }))
}
