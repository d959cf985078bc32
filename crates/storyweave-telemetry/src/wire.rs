//! JSON bodies exchanged between the telemetry service and its clients.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use storyweave_core::telemetry::SessionStats;

use crate::application::query_handlers::SessionSummary;

/// Body of `POST /api/session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Reader name; the service substitutes a default when absent.
    #[serde(default)]
    pub player_name: Option<String>,
}

/// Reply to `POST /api/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    /// Always `true` on success.
    pub success: bool,
    /// The new session id.
    pub session_id: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Body of `POST /api/story/choice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChoiceRequest {
    /// Target session.
    pub session_id: String,
    /// The scene the choice was made on.
    pub scene_id: String,
    /// The chosen option's text.
    pub choice_text: String,
    /// Where the choice led.
    #[serde(default)]
    pub next_scene_id: Option<String>,
    /// 1-based position; the service assumes 1 when absent.
    #[serde(default)]
    pub choice_order: Option<u32>,
}

/// Body of `POST /api/story/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionRequest {
    /// Target session.
    pub session_id: String,
    /// The ending reached.
    #[serde(default)]
    pub ending_id: Option<String>,
}

/// Body of `POST /api/rewards/download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDownloadRequest {
    /// Target session.
    pub session_id: String,
    /// The reward downloaded.
    pub reward_id: String,
    /// The reward's title.
    pub reward_title: String,
}

/// Reply to the recording endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

impl AckResponse {
    /// A successful acknowledgement.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Query of `GET /api/story/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Session to summarize.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply to `GET /api/story/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Counters across all sessions.
    pub stats: SessionStats,
    /// The requested session, when one was named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSummary>,
}

/// Error body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_choice_request_accepts_missing_optionals() {
        let json = r#"{ "sessionId": "s1", "sceneId": "A", "choiceText": "Open it" }"#;

        let request: RecordChoiceRequest = serde_json::from_str(json).unwrap();

        assert!(request.next_scene_id.is_none());
        assert!(request.choice_order.is_none());
    }

    #[test]
    fn test_stats_response_shape() {
        let response = StatsResponse {
            success: true,
            stats: SessionStats {
                total_sessions: 3,
                completed_sessions: 1,
            },
            session: None,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "stats": { "totalSessions": 3, "completedSessions": 1 }
            })
        );
    }
}
