//! The navigation engine.
//!
//! One engine drives one reader through one story. Operations take `&self`
//! and are serialized by the phase: while a load or a transition is in
//! flight, everything except [`NavigationEngine::go_home`] is rejected.
//! Returning home bumps an epoch so results of in-flight operations are
//! discarded when they complete.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storyweave_core::error::StoryError;
use storyweave_core::source::StorySource;
use storyweave_core::telemetry::{ChoiceRecord, TelemetryClient};
use storyweave_story::application::loader::StoryLoader;
use storyweave_story::domain::document::Reward;
use storyweave_story::domain::graph::StoryGraph;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::telemetry::TelemetryShim;
use crate::domain::input::{ChoiceRef, InputEvent};
use crate::domain::resolution::{self, Destination};
use crate::domain::state::{NavigationState, Phase, Rejection, Transition};

/// Player name reported when starting a telemetry session.
pub const DEFAULT_PLAYER_NAME: &str = "Reader";

/// How long any telemetry call may take before it is abandoned.
pub const DEFAULT_TELEMETRY_TIMEOUT: Duration = Duration::from_secs(3);

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name sent with `start_session`.
    pub player_name: String,
    /// Upper bound for each telemetry call.
    pub telemetry_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_name: DEFAULT_PLAYER_NAME.to_owned(),
            telemetry_timeout: DEFAULT_TELEMETRY_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: NavigationState,
    epoch: u64,
}

/// Drives a reader through a story graph.
pub struct NavigationEngine {
    loader: StoryLoader,
    telemetry: TelemetryShim,
    config: EngineConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<NavigationState>,
}

impl std::fmt::Debug for NavigationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEngine")
            .field("loader", &self.loader)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl NavigationEngine {
    /// Creates an idle engine. Nothing is fetched until [`Self::enter`].
    #[must_use]
    pub fn new(
        source: Arc<dyn StorySource>,
        telemetry: Option<Arc<dyn TelemetryClient>>,
        config: EngineConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(NavigationState::default());
        Self {
            loader: StoryLoader::new(source),
            telemetry: TelemetryShim::new(telemetry, config.telemetry_timeout),
            config,
            inner: Mutex::new(Inner::default()),
            state_tx,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> NavigationState {
        self.lock().state.clone()
    }

    /// Receives a snapshot after every applied change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state_tx.subscribe()
    }

    /// The story graph, once loaded.
    #[must_use]
    pub fn graph(&self) -> Option<Arc<StoryGraph>> {
        self.loader.cached()
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rewards offered by the ending reached; empty before the end.
    #[must_use]
    pub fn ending_rewards(&self) -> Vec<Reward> {
        let state = self.state();
        let (Some(ending_id), Some(graph)) = (state.ending_id(), self.graph()) else {
            return Vec::new();
        };
        graph
            .ending(ending_id)
            .map(|ending| graph.rewards_for(ending).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Routes an input event to its operation.
    pub async fn dispatch(&self, event: InputEvent) -> Transition {
        match event {
            InputEvent::Start => self.enter().await,
            InputEvent::SelectChoice(choice) => self.select_choice(choice).await,
            InputEvent::Continue => self.continue_story(),
            InputEvent::Restart => self.restart().await,
            InputEvent::GoHome => self.go_home(),
            InputEvent::Retry => self.retry().await,
            InputEvent::DownloadReward(reward_id) => match self.download_reward(&reward_id) {
                Ok(_) => Transition::Applied(self.state()),
                Err(rejection) => Transition::Rejected(rejection),
            },
        }
    }

    /// Loads the story and shows its start scene.
    #[instrument(skip(self), fields(transition_id = %Uuid::new_v4()))]
    pub async fn enter(&self) -> Transition {
        self.begin("enter", "Loading your story", accept_when_idle)
            .await
    }

    /// Starts over from the start scene with a fresh session.
    #[instrument(skip(self), fields(transition_id = %Uuid::new_v4()))]
    pub async fn restart(&self) -> Transition {
        self.begin("restart", "Restarting your adventure", accept_when_idle)
            .await
    }

    /// Enters again after an error.
    #[instrument(skip(self), fields(transition_id = %Uuid::new_v4()))]
    pub async fn retry(&self) -> Transition {
        self.begin("retry", "Loading your story", |state| match state.phase {
            Phase::Error { .. } => Ok(()),
            _ => Err(wrong_phase("retry", state)),
        })
        .await
    }

    /// Follows a choice of the current scene.
    #[instrument(skip(self), fields(transition_id = %Uuid::new_v4()))]
    pub async fn select_choice(&self, choice: ChoiceRef) -> Transition {
        let (epoch, graph, scene_id, index, choice, record) = {
            let mut inner = self.lock();
            if inner.state.phase != Phase::Ready {
                return reject("select_choice", wrong_phase("select_choice", &inner.state));
            }
            let (Some(graph), Some(scene_id)) =
                (self.loader.cached(), inner.state.current_scene.clone())
            else {
                return reject("select_choice", wrong_phase("select_choice", &inner.state));
            };
            let Some((index, chosen)) = graph
                .scene(&scene_id)
                .and_then(|scene| choice.find(&scene.choices))
            else {
                return reject("select_choice", Rejection::UnknownChoice);
            };
            let chosen = chosen.clone();

            inner.state.phase = Phase::Transitioning;
            inner.state.choice_order += 1;
            inner.state.announcement = Some(format!("You chose: {}", chosen.text));
            self.publish(&inner.state);

            let record = inner.state.session_id.clone().map(|session_id| ChoiceRecord {
                session_id,
                scene_id: scene_id.clone(),
                choice_text: chosen.text.clone(),
                next_scene_id: chosen.destination_id().map(str::to_owned),
                choice_order: inner.state.choice_order,
            });
            (inner.epoch, graph, scene_id, index, chosen, record)
        };

        info!(scene = %scene_id, choice = %choice.text, "choice selected");
        if let Some(record) = &record {
            self.telemetry.record_choice(record).await;
        }

        let outcome = resolution::follow_choice(&graph, &scene_id, index, &choice);
        let mut completed = None;
        let transition = self.settle(epoch, |state| {
            completed = land(state, &scene_id, outcome);
        });
        if let Some((session_id, ending_id)) = completed {
            self.telemetry.complete_session(session_id, ending_id);
        }
        transition
    }

    /// Moves from a terminal scene to its ending.
    #[instrument(skip(self))]
    pub fn continue_story(&self) -> Transition {
        let completed = {
            let mut inner = self.lock();
            if inner.state.phase != Phase::Ready {
                return reject("continue", wrong_phase("continue", &inner.state));
            }
            let (Some(graph), Some(scene_id)) =
                (self.loader.cached(), inner.state.current_scene.clone())
            else {
                return reject("continue", wrong_phase("continue", &inner.state));
            };
            let Some(scene) = graph.scene(&scene_id) else {
                return reject("continue", wrong_phase("continue", &inner.state));
            };
            if !scene.choices.is_empty() {
                return reject("continue", Rejection::NotTerminal);
            }

            let outcome = resolution::follow_terminal(&graph, scene);
            let completed = land(&mut inner.state, &scene_id, outcome);
            self.publish(&inner.state);
            completed
        };

        if let Some((session_id, ending_id)) = completed {
            self.telemetry.complete_session(session_id, ending_id);
        }
        Transition::Applied(self.state())
    }

    /// Returns to the home page, abandoning the story and any operation in
    /// flight. Always accepted.
    #[instrument(skip(self))]
    pub fn go_home(&self) -> Transition {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.state = NavigationState {
            announcement: Some("Returned to homepage".to_owned()),
            ..NavigationState::default()
        };
        self.publish(&inner.state);
        info!("returned to home page");
        Transition::Applied(inner.state.clone())
    }

    /// Hands out a reward of the ending reached and reports the download.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::NotReady` (or `Busy`) outside the ended phase and
    /// `Rejection::UnknownReward` for a reward the ending does not offer.
    #[instrument(skip(self))]
    pub fn download_reward(&self, reward_id: &str) -> Result<Reward, Rejection> {
        let mut inner = self.lock();
        let Some(ending_id) = inner.state.ending_id().map(str::to_owned) else {
            return Err(refuse("download_reward", wrong_phase("download_reward", &inner.state)));
        };
        let reward = self
            .loader
            .cached()
            .and_then(|graph| {
                let ending = graph.ending(&ending_id)?;
                graph
                    .rewards_for(ending)
                    .into_iter()
                    .find(|reward| reward.id == reward_id)
                    .cloned()
            })
            .ok_or_else(|| {
                refuse(
                    "download_reward",
                    Rejection::UnknownReward(reward_id.to_owned()),
                )
            })?;

        inner.state.announcement = Some(format!("Downloading {}", reward.title));
        self.publish(&inner.state);
        info!(reward = %reward.id, file = %reward.file, "reward downloaded");

        if let Some(session_id) = inner.state.session_id.clone() {
            self.telemetry
                .reward_downloaded(session_id, reward.id.clone(), reward.title.clone());
        }
        Ok(reward)
    }

    async fn begin(
        &self,
        operation: &'static str,
        announcement: &str,
        accept: impl FnOnce(&NavigationState) -> Result<(), Rejection>,
    ) -> Transition {
        let epoch = {
            let mut inner = self.lock();
            if let Err(rejection) = accept(&inner.state) {
                return reject(operation, rejection);
            }
            inner.epoch += 1;
            inner.state = NavigationState {
                phase: Phase::Loading,
                announcement: Some(announcement.to_owned()),
                ..NavigationState::default()
            };
            self.publish(&inner.state);
            inner.epoch
        };

        let graph = match self.loader.load().await {
            Ok(graph) => graph,
            Err(e) => {
                error!(operation, error = %e, "story could not be loaded");
                return self.settle(epoch, |state| state.fail(&e));
            }
        };
        let session_id = self.telemetry.start_session(&self.config.player_name).await;

        let start = graph.start_scene();
        info!(operation, scene = %start.id, "story started");
        self.settle(epoch, |state| {
            state.phase = Phase::Ready;
            state.current_scene = Some(start.id.clone());
            state.session_id = session_id;
            state.announcement = Some("Your adventure has begun".to_owned());
        })
    }

    /// Applies the result of an operation unless the engine went home while
    /// it was in flight.
    fn settle(&self, epoch: u64, apply: impl FnOnce(&mut NavigationState)) -> Transition {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("result discarded after returning home");
            return Transition::Rejected(Rejection::Superseded);
        }
        apply(&mut inner.state);
        self.publish(&inner.state);
        Transition::Applied(inner.state.clone())
    }

    fn publish(&self, state: &NavigationState) {
        self.state_tx.send_replace(state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Moves `state` from scene `from` to `outcome`. Returns the session and
/// ending to report when an ending was reached.
fn land(
    state: &mut NavigationState,
    from: &str,
    outcome: Result<Destination<'_>, StoryError>,
) -> Option<(String, String)> {
    match outcome {
        Ok(Destination::Scene(next)) => {
            state.scene_history.push(from.to_owned());
            state.phase = Phase::Ready;
            state.current_scene = Some(next.id.clone());
            state.announcement = Some(format!("Now experiencing: {}", next.title));
            debug!(scene = %next.id, progress = state.progress(), "scene entered");
            None
        }
        Ok(Destination::Ending(ending)) => {
            state.scene_history.push(from.to_owned());
            state.phase = Phase::Ended {
                ending_id: ending.id.clone(),
            };
            state.current_scene = None;
            state.announcement = Some(format!("Story complete: {}", ending.title));
            info!(ending = %ending.id, "ending reached");
            state
                .session_id
                .clone()
                .map(|session_id| (session_id, ending.id.clone()))
        }
        Err(e) => {
            error!(scene = %from, error = %e, "transition failed");
            state.fail(&e);
            None
        }
    }
}

fn accept_when_idle(state: &NavigationState) -> Result<(), Rejection> {
    if state.is_busy() {
        Err(Rejection::Busy)
    } else {
        Ok(())
    }
}

fn wrong_phase(operation: &'static str, state: &NavigationState) -> Rejection {
    if state.is_busy() {
        Rejection::Busy
    } else {
        Rejection::NotReady {
            operation,
            phase: state.phase.name(),
        }
    }
}

fn refuse(operation: &'static str, rejection: Rejection) -> Rejection {
    debug!(operation, %rejection, "input rejected");
    rejection
}

fn reject(operation: &'static str, rejection: Rejection) -> Transition {
    Transition::Rejected(refuse(operation, rejection))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use storyweave_core::error::ErrorKind;
    use storyweave_test_support::{
        FailingStorySource, InMemoryStorySource, RecordingTelemetry, TEST_SESSION_ID,
        TelemetryCall, fixtures,
    };

    use super::*;
    use crate::domain::state::Page;

    fn engine(json: String) -> NavigationEngine {
        NavigationEngine::new(
            Arc::new(InMemoryStorySource::json(json)),
            None,
            EngineConfig::default(),
        )
    }

    fn engine_with_telemetry(json: String, telemetry: Arc<RecordingTelemetry>) -> NavigationEngine {
        NavigationEngine::new(
            Arc::new(InMemoryStorySource::json(json)),
            Some(telemetry),
            EngineConfig {
                telemetry_timeout: Duration::from_millis(200),
                ..EngineConfig::default()
            },
        )
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.player_name, "Reader");
        assert_eq!(config.telemetry_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_new_engine_is_idle_on_home_page() {
        let engine = engine(fixtures::linear_story());

        let state = engine.state();

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.page(), Page::Home);
        assert!(engine.graph().is_none());
    }

    #[tokio::test]
    async fn test_enter_shows_start_scene_and_starts_session() {
        // Arrange
        let telemetry = Arc::new(RecordingTelemetry::new());
        let engine = engine_with_telemetry(fixtures::linear_story(), telemetry.clone());

        // Act
        let transition = engine.enter().await;

        // Assert
        let state = transition.state().unwrap();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.current_scene.as_deref(), Some("A"));
        assert_eq!(state.session_id.as_deref(), Some(TEST_SESSION_ID));
        assert_eq!(state.announcement.as_deref(), Some("Your adventure has begun"));
        assert_eq!(
            telemetry.calls(),
            vec![TelemetryCall::StartSession("Reader".into())]
        );
    }

    #[tokio::test]
    async fn test_enter_without_telemetry_has_no_session() {
        let engine = engine(fixtures::linear_story());

        let state = engine.enter().await.state().cloned().unwrap();

        assert_eq!(state.phase, Phase::Ready);
        assert!(state.session_id.is_none());
    }

    #[tokio::test]
    async fn test_enter_unreachable_story_lands_in_error() {
        let engine = NavigationEngine::new(
            Arc::new(FailingStorySource::unreachable()),
            None,
            EngineConfig::default(),
        );

        let state = engine.enter().await.state().cloned().unwrap();

        assert!(matches!(
            state.phase,
            Phase::Error { kind: ErrorKind::Transport, .. }
        ));
        assert_eq!(state.page(), Page::Error);
    }

    #[tokio::test]
    async fn test_select_choice_reports_choice_with_order() {
        // Arrange
        let telemetry = Arc::new(RecordingTelemetry::new());
        let engine = engine_with_telemetry(fixtures::linear_story(), telemetry.clone());
        engine.enter().await;

        // Act
        engine.select_choice(ChoiceRef::Index(0)).await;
        engine.select_choice(ChoiceRef::from("Say yes")).await;

        // Assert
        let choices = telemetry.choices();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].scene_id, "A");
        assert_eq!(choices[0].next_scene_id.as_deref(), Some("B"));
        assert_eq!(choices[0].choice_order, 1);
        assert_eq!(choices[1].choice_text, "Say yes");
        assert_eq!(choices[1].next_scene_id.as_deref(), Some("E1"));
        assert_eq!(choices[1].choice_order, 2);
    }

    #[tokio::test]
    async fn test_select_choice_outside_ready_is_rejected() {
        let engine = engine(fixtures::linear_story());

        let transition = engine.select_choice(ChoiceRef::Index(0)).await;

        assert_eq!(
            transition.rejection(),
            Some(&Rejection::NotReady {
                operation: "select_choice",
                phase: "idle"
            })
        );
        assert_eq!(engine.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_unknown_choice_is_rejected_without_change() {
        let engine = engine(fixtures::linear_story());
        let before = engine.enter().await.state().cloned().unwrap();

        let transition = engine.select_choice(ChoiceRef::Index(7)).await;

        assert_eq!(transition.rejection(), Some(&Rejection::UnknownChoice));
        assert_eq!(engine.state(), before);
    }

    #[tokio::test]
    async fn test_ending_reports_completion() {
        // Arrange
        let telemetry = Arc::new(RecordingTelemetry::new());
        let engine = engine_with_telemetry(fixtures::branching_story(), telemetry.clone());
        engine.enter().await;

        // Act
        let state = engine
            .select_choice(ChoiceRef::from("Stay in tonight"))
            .await
            .state()
            .cloned()
            .unwrap();

        // Assert
        assert_eq!(state.ending_id(), Some("cozy"));
        assert_eq!(state.announcement.as_deref(), Some("Story complete: Cozy Ending"));
        let calls = telemetry.wait_for_calls(3).await;
        assert_eq!(
            calls.last(),
            Some(&TelemetryCall::CompleteSession(
                TEST_SESSION_ID.into(),
                "cozy".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_continue_from_terminal_scene_reaches_its_ending() {
        let engine = engine(fixtures::branching_story());
        engine.enter().await;
        engine.select_choice(ChoiceRef::from("Suggest a walk in the park")).await;

        let state = engine.continue_story().state().cloned().unwrap();

        assert_eq!(state.ending_id(), Some("sunset"));
        assert_eq!(state.scene_history, vec!["meet", "park"]);
        assert_eq!(state.progress(), 3);
    }

    #[tokio::test]
    async fn test_continue_from_scene_with_choices_is_rejected() {
        let engine = engine(fixtures::branching_story());
        engine.enter().await;

        let transition = engine.continue_story();

        assert_eq!(transition.rejection(), Some(&Rejection::NotTerminal));
    }

    #[tokio::test]
    async fn test_continue_from_scene_without_exit_is_dead_end() {
        let engine = engine(fixtures::dead_end_story());
        engine.enter().await;
        engine.select_choice(ChoiceRef::Index(1)).await;

        let state = engine.continue_story().state().cloned().unwrap();

        assert!(matches!(
            state.phase,
            Phase::Error { kind: ErrorKind::DeadEnd, .. }
        ));
        assert_eq!(state.scene_history, vec!["A"]);
    }

    #[tokio::test]
    async fn test_choice_without_target_is_dead_end() {
        let engine = engine(fixtures::dead_end_story());
        engine.enter().await;

        let state = engine
            .select_choice(ChoiceRef::Index(0))
            .await
            .state()
            .cloned()
            .unwrap();

        assert!(matches!(
            state.phase,
            Phase::Error { kind: ErrorKind::DeadEnd, .. }
        ));
        assert!(state.scene_history.is_empty());
    }

    #[tokio::test]
    async fn test_download_reward_returns_offered_reward_and_reports_it() {
        // Arrange
        let telemetry = Arc::new(RecordingTelemetry::new());
        let engine = engine_with_telemetry(fixtures::branching_story(), telemetry.clone());
        engine.enter().await;
        engine.select_choice(ChoiceRef::Index(0)).await;
        engine.select_choice(ChoiceRef::from("Order cocoa")).await;

        // Act
        let reward = engine.download_reward("playlist").unwrap();

        // Assert
        assert_eq!(reward.download_name(), "our-songs.txt");
        assert_eq!(
            engine.state().announcement.as_deref(),
            Some("Downloading Playlist")
        );
        let calls = telemetry.wait_for_calls(5).await;
        assert!(calls.contains(&TelemetryCall::RewardDownload(
            TEST_SESSION_ID.into(),
            "playlist".into(),
            "Playlist".into()
        )));
    }

    #[tokio::test]
    async fn test_download_reward_not_offered_by_ending_is_rejected() {
        let engine = engine(fixtures::branching_story());
        engine.enter().await;
        engine.select_choice(ChoiceRef::Index(0)).await;
        engine.select_choice(ChoiceRef::from("Order cocoa")).await;

        let err = engine.download_reward("letter").unwrap_err();

        assert_eq!(err, Rejection::UnknownReward("letter".into()));
    }

    #[tokio::test]
    async fn test_download_reward_before_the_end_is_rejected() {
        let engine = engine(fixtures::branching_story());
        engine.enter().await;

        let err = engine.download_reward("poem").unwrap_err();

        assert!(matches!(err, Rejection::NotReady { phase: "ready", .. }));
    }

    #[tokio::test]
    async fn test_ending_rewards_fall_back_to_defaults() {
        let engine = engine(fixtures::branching_story());
        engine.enter().await;
        engine.select_choice(ChoiceRef::from("Stay in tonight")).await;

        let ids: Vec<String> = engine.ending_rewards().into_iter().map(|r| r.id).collect();

        assert_eq!(ids, vec!["letter", "photo"]);
    }

    #[tokio::test]
    async fn test_go_home_resets_everything() {
        let engine = engine(fixtures::linear_story());
        engine.enter().await;
        engine.select_choice(ChoiceRef::Index(0)).await;

        let state = engine.go_home().state().cloned().unwrap();

        assert_eq!(state.phase, Phase::Idle);
        assert!(state.current_scene.is_none());
        assert!(state.scene_history.is_empty());
        assert_eq!(state.choice_order, 0);
        assert_eq!(state.announcement.as_deref(), Some("Returned to homepage"));
    }

    #[tokio::test]
    async fn test_retry_outside_error_is_rejected() {
        let engine = engine(fixtures::linear_story());

        let transition = engine.retry().await;

        assert!(matches!(
            transition.rejection(),
            Some(Rejection::NotReady { operation: "retry", .. })
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_every_applied_change() {
        let engine = engine(fixtures::linear_story());
        let mut rx = engine.subscribe();

        engine.enter().await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().current_scene.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_dispatch_routes_events() {
        let engine = engine(fixtures::linear_story());

        engine.dispatch(InputEvent::Start).await;
        engine
            .dispatch(InputEvent::SelectChoice(ChoiceRef::Index(0)))
            .await;
        let transition = engine.dispatch(InputEvent::GoHome).await;

        assert_eq!(transition.state().unwrap().phase, Phase::Idle);
        let rejected = engine
            .dispatch(InputEvent::DownloadReward("letter".into()))
            .await;
        assert!(!rejected.is_applied());
    }
}
