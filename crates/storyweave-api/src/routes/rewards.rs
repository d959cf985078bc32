//! Reward download tracking under `/api/rewards`.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use storyweave_telemetry::application::command_handlers;
use storyweave_telemetry::domain::commands::RecordRewardDownload;
use storyweave_telemetry::wire::{AckResponse, RewardDownloadRequest};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /api/rewards/download
#[instrument(skip(state, body), fields(session_id = %body.session_id, reward_id = %body.reward_id))]
async fn record_download(
    State(state): State<AppState>,
    AppJson(body): AppJson<RewardDownloadRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let command = RecordRewardDownload {
        correlation_id: Uuid::new_v4(),
        session_id: body.session_id,
        reward_id: body.reward_id,
        reward_title: body.reward_title,
    };

    info!(correlation_id = %command.correlation_id, "handling record_reward_download command");

    command_handlers::handle_record_reward_download(
        &command,
        state.clock.as_ref(),
        &*state.store,
    )
    .await?;

    Ok(Json(AckResponse::ok("Reward download tracked successfully")))
}

/// Returns the router for reward endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/download", post(record_download))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use storyweave_telemetry::application::store::SessionStore;
    use storyweave_telemetry::domain::session::StorySession;
    use storyweave_test_support::FixedClock;
    use tower::ServiceExt;

    use super::*;
    use crate::state::testing::test_app_state;

    async fn post_download(state: AppState, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/download")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        let response = router().with_state(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn test_download_is_tracked_for_known_session() {
        // Arrange
        let state = test_app_state();
        let store = state.store.clone();
        store
            .save(StorySession::start(
                "s1".into(),
                "Ada".into(),
                &FixedClock::at_test_epoch(),
            ))
            .await
            .unwrap();
        let body = json!({ "sessionId": "s1", "rewardId": "poem", "rewardTitle": "A Poem" });

        // Act
        let (status, json) = post_download(state, &body).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Reward download tracked successfully");
        let downloads = store.downloads("s1").await.unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].reward_title, "A Poem");
    }

    #[tokio::test]
    async fn test_download_for_unknown_session_returns_404() {
        let body = json!({ "sessionId": "ghost", "rewardId": "poem", "rewardTitle": "A Poem" });

        let (status, json) = post_download(test_app_state(), &body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_download_with_blank_reward_returns_400() {
        let body = json!({ "sessionId": "s1", "rewardId": "", "rewardTitle": "A Poem" });

        let (status, _) = post_download(test_app_state(), &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
