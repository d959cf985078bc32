//! Choice, completion and stats endpoints under `/api/story`.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use storyweave_telemetry::application::{command_handlers, query_handlers};
use storyweave_telemetry::domain::commands::{CompleteSession, RecordChoice};
use storyweave_telemetry::wire::{
    AckResponse, CompleteSessionRequest, RecordChoiceRequest, StatsQuery, StatsResponse,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

/// POST /api/story/choice
#[instrument(skip(state, body), fields(session_id = %body.session_id))]
async fn record_choice(
    State(state): State<AppState>,
    AppJson(body): AppJson<RecordChoiceRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let command = RecordChoice {
        correlation_id: Uuid::new_v4(),
        session_id: body.session_id,
        scene_id: body.scene_id,
        choice_text: body.choice_text,
        next_scene_id: body.next_scene_id,
        choice_order: body.choice_order,
    };

    info!(correlation_id = %command.correlation_id, "handling record_choice command");

    command_handlers::handle_record_choice(&command, state.clock.as_ref(), &*state.store).await?;

    Ok(Json(AckResponse::ok("Choice recorded successfully")))
}

/// POST /api/story/complete
#[instrument(skip(state, body), fields(session_id = %body.session_id))]
async fn complete_session(
    State(state): State<AppState>,
    AppJson(body): AppJson<CompleteSessionRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let command = CompleteSession {
        correlation_id: Uuid::new_v4(),
        session_id: body.session_id,
        ending_id: body.ending_id,
    };

    info!(correlation_id = %command.correlation_id, "handling complete_session command");

    command_handlers::handle_complete_session(&command, state.clock.as_ref(), &*state.store)
        .await?;

    Ok(Json(AckResponse::ok("Story completed successfully")))
}

/// GET /api/story/stats
#[instrument(skip(state))]
async fn get_stats(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StatsQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let view = query_handlers::get_stats(query.session_id.as_deref(), &*state.store).await?;

    Ok(Json(StatsResponse {
        success: true,
        stats: view.stats,
        session: view.session,
    }))
}

/// Returns the router for story telemetry endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/choice", post(record_choice))
        .route("/complete", post(complete_session))
        .route("/stats", get(get_stats))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use storyweave_core::clock::Clock;
    use storyweave_telemetry::application::store::SessionStore;
    use storyweave_telemetry::domain::session::StorySession;
    use storyweave_test_support::FixedClock;
    use tower::ServiceExt;

    use super::*;
    use crate::state::testing::test_app_state;

    async fn seeded_state() -> AppState {
        let state = test_app_state();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_test_epoch());
        state
            .store
            .save(StorySession::start("s1".into(), "Ada".into(), clock.as_ref()))
            .await
            .unwrap();
        state
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let app = router().with_state(state);
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_choice_appends_to_session() {
        // Arrange
        let state = seeded_state().await;
        let store = state.store.clone();
        let body = json!({
            "sessionId": "s1",
            "sceneId": "A",
            "choiceText": "Open the letter",
            "nextSceneId": "B",
            "choiceOrder": 2
        });

        // Act
        let (status, json) = send(state, post_json("/choice", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Choice recorded successfully");
        let session = store.load("s1").await.unwrap().unwrap();
        assert_eq!(session.choices.len(), 1);
        assert_eq!(session.choices[0].choice_order, 2);
    }

    #[tokio::test]
    async fn test_record_choice_for_unknown_session_returns_404() {
        let body = json!({ "sessionId": "nope", "sceneId": "A", "choiceText": "Go" });

        let (status, json) = send(test_app_state(), post_json("/choice", &body)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_record_choice_with_blank_text_returns_400() {
        let state = seeded_state().await;
        let body = json!({ "sessionId": "s1", "sceneId": "A", "choiceText": "  " });

        let (status, json) = send(state, post_json("/choice", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_record_choice_missing_field_returns_422() {
        let state = seeded_state().await;
        let body = json!({ "sessionId": "s1" });

        let (status, json) = send(state, post_json("/choice", &body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "invalid_json");
    }

    #[tokio::test]
    async fn test_complete_then_stats_counts_completion() {
        // Arrange
        let state = seeded_state().await;
        let body = json!({ "sessionId": "s1", "endingId": "E1" });
        let (status, _) = send(state.clone(), post_json("/complete", &body)).await;
        assert_eq!(status, StatusCode::OK);

        // Act
        let request = Request::builder()
            .uri("/stats?sessionId=s1")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(state, request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stats"]["totalSessions"], 1);
        assert_eq!(json["stats"]["completedSessions"], 1);
        assert_eq!(json["session"]["endingId"], "E1");
        assert_eq!(json["session"]["completed"], true);
    }

    #[tokio::test]
    async fn test_stats_without_session_omits_summary() {
        let state = seeded_state().await;
        let request = Request::builder()
            .uri("/stats")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stats"]["totalSessions"], 1);
        assert!(json.get("session").is_none());
    }

    #[tokio::test]
    async fn test_stats_with_malformed_query_returns_json_400() {
        let request = Request::builder()
            .uri("/stats?sessionId=a&sessionId=b")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(test_app_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_query");
    }

    #[tokio::test]
    async fn test_stats_for_unknown_session_returns_404() {
        let request = Request::builder()
            .uri("/stats?sessionId=ghost")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(test_app_state(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
