//! Query handlers for the telemetry service.

use serde::{Deserialize, Serialize};
use storyweave_core::telemetry::SessionStats;
use tracing::instrument;

use crate::application::store::SessionStore;
use crate::error::ServiceError;

/// Per-session figures returned alongside the global counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: String,
    /// Reader name.
    pub player_name: String,
    /// Number of recorded choices.
    pub total_choices: usize,
    /// Whether an ending was reached.
    pub completed: bool,
    /// The ending reached, when reported.
    pub ending_id: Option<String>,
    /// Number of reward downloads.
    pub reward_downloads: usize,
}

/// Result of a stats query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    /// Counters across all sessions.
    pub stats: SessionStats,
    /// The requested session, when one was named.
    pub session: Option<SessionSummary>,
}

/// Returns the global counters and, when `session_id` is given, a summary
/// of that session.
///
/// # Errors
///
/// Returns `ServiceError::SessionNotFound` if `session_id` names no session,
/// or a store error.
#[instrument(skip(store))]
pub async fn get_stats(
    session_id: Option<&str>,
    store: &dyn SessionStore,
) -> Result<StatsView, ServiceError> {
    let stats = store.stats().await?;

    let session = match session_id.filter(|id| !id.is_empty()) {
        None => None,
        Some(id) => {
            let session = store
                .load(id)
                .await?
                .ok_or_else(|| ServiceError::SessionNotFound(id.to_owned()))?;
            let reward_downloads = store.downloads(id).await?.len();
            Some(SessionSummary {
                completed: session.is_completed(),
                total_choices: session.choices.len(),
                session_id: session.session_id,
                player_name: session.player_name,
                ending_id: session.ending_id,
                reward_downloads,
            })
        }
    };

    Ok(StatsView { stats, session })
}
