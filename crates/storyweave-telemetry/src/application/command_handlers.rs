//! Command handlers for the telemetry service.
//!
//! Each handler loads the session, applies the change and saves it back.

use std::sync::Mutex;

use rand::RngCore;
use storyweave_core::clock::Clock;
use tracing::{info, instrument};

use crate::application::store::SessionStore;
use crate::domain::commands::{CompleteSession, RecordChoice, RecordRewardDownload, StartSession};
use crate::domain::session::{self, RewardDownload, StorySession};
use crate::error::ServiceError;

/// Player name used when a session is started without one.
pub const DEFAULT_PLAYER_NAME: &str = "Reader";

async fn load_existing(
    store: &dyn SessionStore,
    session_id: &str,
) -> Result<StorySession, ServiceError> {
    store
        .load(session_id)
        .await?
        .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_owned()))
}

/// Handles `StartSession`: generates an id and stores a fresh session.
///
/// The `Mutex` is locked only while generating the id, never across an
/// await point.
///
/// # Errors
///
/// Returns `ServiceError::Infrastructure` if the RNG mutex is poisoned or
/// the store fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_start_session(
    command: &StartSession,
    clock: &dyn Clock,
    rng: &Mutex<dyn RngCore + Send>,
    store: &dyn SessionStore,
) -> Result<StorySession, ServiceError> {
    let session_id = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| ServiceError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        session::generate_session_id(clock, &mut *rng_guard)
    };
    let player_name = command
        .player_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PLAYER_NAME)
        .to_owned();

    let session = store
        .save(StorySession::start(session_id, player_name, clock))
        .await?;
    info!(session_id = %session.session_id, player = %session.player_name, "session started");
    Ok(session)
}

/// Handles `RecordChoice`.
///
/// # Errors
///
/// Returns `ServiceError::SessionNotFound` for an unknown session,
/// `ServiceError::Validation` for blank fields, or a store error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_record_choice(
    command: &RecordChoice,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<StorySession, ServiceError> {
    let mut session = load_existing(store, &command.session_id).await?;
    session.record_choice(
        command.scene_id.clone(),
        command.choice_text.clone(),
        command.next_scene_id.clone(),
        command.choice_order.unwrap_or(1),
        clock,
    )?;

    let session = store.save(session).await?;
    info!(choices = session.choices.len(), "choice recorded");
    Ok(session)
}

/// Handles `CompleteSession`.
///
/// # Errors
///
/// Returns `ServiceError::SessionNotFound` for an unknown session, or a
/// store error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_complete_session(
    command: &CompleteSession,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<StorySession, ServiceError> {
    let mut session = load_existing(store, &command.session_id).await?;
    session.complete(command.ending_id.clone(), clock);

    let session = store.save(session).await?;
    info!(ending = ?session.ending_id, "session completed");
    Ok(session)
}

/// Handles `RecordRewardDownload`.
///
/// # Errors
///
/// Returns `ServiceError::SessionNotFound` for an unknown session,
/// `ServiceError::Validation` for a blank reward id, or a store error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_record_reward_download(
    command: &RecordRewardDownload,
    clock: &dyn Clock,
    store: &dyn SessionStore,
) -> Result<RewardDownload, ServiceError> {
    if command.reward_id.trim().is_empty() {
        return Err(ServiceError::Validation("rewardId must not be blank".into()));
    }
    load_existing(store, &command.session_id).await?;

    let download = RewardDownload {
        session_id: command.session_id.clone(),
        reward_id: command.reward_id.clone(),
        reward_title: command.reward_title.clone(),
        downloaded_at: clock.now(),
    };
    store.save_download(download.clone()).await?;
    info!(reward = %download.reward_id, "reward download recorded");
    Ok(download)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storyweave_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::application::store::InMemorySessionStore;

    fn rng() -> Mutex<StdRng> {
        Mutex::new(StdRng::seed_from_u64(1))
    }

    async fn started(store: &InMemorySessionStore) -> StorySession {
        let rng = rng();
        let rng_ref: &Mutex<dyn RngCore + Send> = &rng;
        handle_start_session(
            &StartSession {
                correlation_id: Uuid::new_v4(),
                player_name: None,
            },
            &FixedClock::at_test_epoch(),
            rng_ref,
            store,
        )
        .await
        .unwrap()
    }

    fn choice(session_id: &str, order: Option<u32>) -> RecordChoice {
        RecordChoice {
            correlation_id: Uuid::new_v4(),
            session_id: session_id.into(),
            scene_id: "A".into(),
            choice_text: "Open it".into(),
            next_scene_id: Some("B".into()),
            choice_order: order,
        }
    }

    #[tokio::test]
    async fn test_start_session_defaults_player_name() {
        // Arrange
        let store = InMemorySessionStore::new();

        // Act
        let session = started(&store).await;

        // Assert
        assert!(session.session_id.starts_with("session_1768471200000_"));
        assert_eq!(session.player_name, "Reader");
        assert!(store.load(&session.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_start_session_keeps_given_player_name() {
        let store = InMemorySessionStore::new();
        let rng = rng();
        let rng_ref: &Mutex<dyn RngCore + Send> = &rng;

        let session = handle_start_session(
            &StartSession {
                correlation_id: Uuid::new_v4(),
                player_name: Some("  Ada ".into()),
            },
            &FixedClock::at_test_epoch(),
            rng_ref,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(session.player_name, "Ada");
    }

    #[tokio::test]
    async fn test_record_choice_defaults_order_to_one() {
        let store = InMemorySessionStore::new();
        let session = started(&store).await;

        let updated = handle_record_choice(
            &choice(&session.session_id, None),
            &FixedClock::at_test_epoch(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(updated.choices.len(), 1);
        assert_eq!(updated.choices[0].choice_order, 1);
    }

    #[tokio::test]
    async fn test_record_choice_for_unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();

        let err = handle_record_choice(&choice("nope", Some(1)), &FixedClock::at_test_epoch(), &store)
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::SessionNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_complete_session_marks_completion() {
        let store = InMemorySessionStore::new();
        let session = started(&store).await;

        let completed = handle_complete_session(
            &CompleteSession {
                correlation_id: Uuid::new_v4(),
                session_id: session.session_id.clone(),
                ending_id: Some("E1".into()),
            },
            &FixedClock::at_test_epoch(),
            &store,
        )
        .await
        .unwrap();

        assert!(completed.is_completed());
        assert_eq!(store.stats().await.unwrap().completed_sessions, 1);
    }

    #[tokio::test]
    async fn test_reward_download_requires_known_session() {
        let store = InMemorySessionStore::new();

        let err = handle_record_reward_download(
            &RecordRewardDownload {
                correlation_id: Uuid::new_v4(),
                session_id: "nope".into(),
                reward_id: "poem".into(),
                reward_title: "Poem".into(),
            },
            &FixedClock::at_test_epoch(),
            &store,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::SessionNotFound(_)));
        assert!(store.downloads("nope").await.unwrap().is_empty());
    }
}
