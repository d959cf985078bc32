//! Commands accepted by the telemetry service.

use uuid::Uuid;

/// Start a reading session.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Reader name; blank means the default.
    pub player_name: Option<String>,
}

/// Record a choice made in a session.
#[derive(Debug, Clone)]
pub struct RecordChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: String,
    /// The scene the choice was made on.
    pub scene_id: String,
    /// The chosen option's text.
    pub choice_text: String,
    /// Where the choice led.
    pub next_scene_id: Option<String>,
    /// 1-based position; defaults to 1 when absent.
    pub choice_order: Option<u32>,
}

/// Mark a session as completed.
#[derive(Debug, Clone)]
pub struct CompleteSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: String,
    /// The ending reached, if known.
    pub ending_id: Option<String>,
}

/// Record a reward download.
#[derive(Debug, Clone)]
pub struct RecordRewardDownload {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: String,
    /// The reward downloaded.
    pub reward_id: String,
    /// The reward's title.
    pub reward_title: String,
}
