//! Reading sessions.

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use storyweave_core::clock::Clock;

use crate::error::ServiceError;

const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a session id of the form `session_<unix-millis>_<9 base-36 chars>`.
pub fn generate_session_id(clock: &dyn Clock, rng: &mut dyn RngCore) -> String {
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("session_{}_{suffix}", clock.unix_millis())
}

/// One choice recorded in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedChoice {
    /// The scene the choice was made on.
    pub scene_id: String,
    /// The chosen option's text.
    pub choice_text: String,
    /// Where the choice led.
    pub next_scene_id: Option<String>,
    /// 1-based position in the session.
    pub choice_order: u32,
    /// When the choice was recorded.
    pub chosen_at: DateTime<Utc>,
}

/// A reward download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDownload {
    /// The session it happened in.
    pub session_id: String,
    /// The reward downloaded.
    pub reward_id: String,
    /// The reward's title at download time.
    pub reward_title: String,
    /// When it happened.
    pub downloaded_at: DateTime<Utc>,
}

/// A reader's pass through the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySession {
    /// Session identifier.
    pub session_id: String,
    /// Name the reader started with.
    pub player_name: String,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When an ending was reached.
    pub completed_at: Option<DateTime<Utc>>,
    /// The ending reached, when reported.
    pub ending_id: Option<String>,
    /// Choices in the order they were recorded.
    pub choices: Vec<RecordedChoice>,
    /// Number of saved changes; guards against lost updates.
    #[serde(default)]
    pub version: u64,
}

impl StorySession {
    /// Starts a session.
    #[must_use]
    pub fn start(session_id: String, player_name: String, clock: &dyn Clock) -> Self {
        Self {
            session_id,
            player_name,
            started_at: clock.now(),
            completed_at: None,
            ending_id: None,
            choices: Vec::new(),
            version: 0,
        }
    }

    /// Appends a choice.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the scene id or choice text is
    /// blank, or the order is zero.
    pub fn record_choice(
        &mut self,
        scene_id: String,
        choice_text: String,
        next_scene_id: Option<String>,
        choice_order: u32,
        clock: &dyn Clock,
    ) -> Result<(), ServiceError> {
        if scene_id.trim().is_empty() {
            return Err(ServiceError::Validation("sceneId must not be blank".into()));
        }
        if choice_text.trim().is_empty() {
            return Err(ServiceError::Validation("choiceText must not be blank".into()));
        }
        if choice_order == 0 {
            return Err(ServiceError::Validation("choiceOrder starts at 1".into()));
        }

        self.choices.push(RecordedChoice {
            scene_id,
            choice_text,
            next_scene_id,
            choice_order,
            chosen_at: clock.now(),
        });
        Ok(())
    }

    /// Marks the session as completed. A repeated completion keeps the
    /// first completion time and updates the ending when one is given.
    pub fn complete(&mut self, ending_id: Option<String>, clock: &dyn Clock) {
        if self.completed_at.is_none() {
            self.completed_at = Some(clock.now());
        }
        if ending_id.is_some() {
            self.ending_id = ending_id;
        }
    }

    /// Whether an ending was reached.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
