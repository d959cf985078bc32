//! Telemetry client abstraction.
//!
//! Telemetry is best-effort reporting of sessions, choices, completions and
//! reward downloads. The navigation engine never depends on it succeeding.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoryError;

/// One choice made by the reader, as reported to telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRecord {
    /// The session the choice belongs to.
    pub session_id: String,
    /// The scene the choice was made on.
    pub scene_id: String,
    /// The text of the chosen option.
    pub choice_text: String,
    /// The target scene id, or the ending id for ending choices.
    pub next_scene_id: Option<String>,
    /// 1-based position of this choice within the session.
    pub choice_order: u32,
}

/// Aggregate counters reported by the telemetry backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Number of sessions ever started.
    pub total_sessions: u64,
    /// Number of sessions that reached an ending.
    pub completed_sessions: u64,
}

/// Client side of the telemetry service.
#[async_trait]
pub trait TelemetryClient: Send + Sync {
    /// Starts a new reading session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Telemetry` if the backend rejects or cannot be reached.
    async fn start_session(&self, player_name: &str) -> Result<String, StoryError>;

    /// Records a choice.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Telemetry` if the backend rejects or cannot be reached.
    async fn record_choice(&self, record: &ChoiceRecord) -> Result<(), StoryError>;

    /// Marks a session as completed at the given ending.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Telemetry` if the backend rejects or cannot be reached.
    async fn complete_session(&self, session_id: &str, ending_id: &str) -> Result<(), StoryError>;

    /// Records that a reward was downloaded.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Telemetry` if the backend rejects or cannot be reached.
    async fn record_reward_download(
        &self,
        session_id: &str,
        reward_id: &str,
        reward_title: &str,
    ) -> Result<(), StoryError>;

    /// Fetches aggregate stats.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Telemetry` if the backend rejects or cannot be reached.
    async fn get_stats(&self, session_id: &str) -> Result<SessionStats, StoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_record_uses_camel_case_on_the_wire() {
        let record = ChoiceRecord {
            session_id: "session_1_abc".into(),
            scene_id: "garden".into(),
            choice_text: "Pick a rose".into(),
            next_scene_id: Some("fountain".into()),
            choice_order: 2,
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["sessionId"], "session_1_abc");
        assert_eq!(json["sceneId"], "garden");
        assert_eq!(json["choiceText"], "Pick a rose");
        assert_eq!(json["nextSceneId"], "fountain");
        assert_eq!(json["choiceOrder"], 2);
    }
}
