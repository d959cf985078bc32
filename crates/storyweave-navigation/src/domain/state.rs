//! Navigation state and the outcome of engine operations.

use serde::Serialize;
use storyweave_core::error::{ErrorKind, StoryError};
use thiserror::Error;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// On the home page; no story in progress.
    #[default]
    Idle,
    /// Fetching the story and starting a session.
    Loading,
    /// Showing a scene and waiting for input.
    Ready,
    /// A choice was accepted and is being resolved.
    Transitioning,
    /// An ending was reached.
    Ended {
        /// The ending reached.
        ending_id: String,
    },
    /// Loading or a transition failed.
    Error {
        /// What went wrong.
        kind: ErrorKind,
        /// Message for the reader.
        message: String,
    },
}

impl Phase {
    /// Short name for logs and rejections.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Transitioning => "transitioning",
            Self::Ended { .. } => "ended",
            Self::Error { .. } => "error",
        }
    }
}

/// The page a presentation should show for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Landing page.
    Home,
    /// A scene.
    Story,
    /// An ending with its rewards.
    End,
    /// An error message with a retry option.
    Error,
}

/// Snapshot of the reader's position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Lifecycle phase.
    #[serde(flatten)]
    pub phase: Phase,
    /// The scene being shown, if any.
    pub current_scene: Option<String>,
    /// Scenes left behind, in visit order. Revisits are repeated.
    pub scene_history: Vec<String>,
    /// Number of choices made in this session.
    pub choice_order: u32,
    /// Telemetry session, when one could be started.
    pub session_id: Option<String>,
    /// Screen-reader message for the latest change.
    pub announcement: Option<String>,
}

impl NavigationState {
    /// Page derived from the phase.
    #[must_use]
    pub fn page(&self) -> Page {
        match self.phase {
            Phase::Idle | Phase::Loading => Page::Home,
            Phase::Ready | Phase::Transitioning => Page::Story,
            Phase::Ended { .. } => Page::End,
            Phase::Error { .. } => Page::Error,
        }
    }

    /// Whether the story is being fetched.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Transitioning)
    }

    /// 1-based scene number.
    #[must_use]
    pub fn progress(&self) -> usize {
        self.scene_history.len() + 1
    }

    /// The ending reached, if the story is over.
    #[must_use]
    pub fn ending_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Ended { ending_id } => Some(ending_id),
            _ => None,
        }
    }

    pub(crate) fn fail(&mut self, error: &StoryError) {
        let message = error.user_message();
        self.announcement = Some(format!("Error: {message}"));
        self.phase = Phase::Error {
            kind: error.kind(),
            message,
        };
    }
}

/// Why the engine refused an operation. Rejections change nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Another operation is in flight.
    #[error("another operation is in progress")]
    Busy,

    /// The operation is not valid in the current phase.
    #[error("`{operation}` is not valid while {phase}")]
    NotReady {
        /// The refused operation.
        operation: &'static str,
        /// The phase the engine was in.
        phase: &'static str,
    },

    /// The choice reference matches no choice of the current scene.
    #[error("no such choice on the current scene")]
    UnknownChoice,

    /// The current scene has choices, so it cannot be continued past.
    #[error("the current scene is not terminal")]
    NotTerminal,

    /// The reward is not offered by the ending reached.
    #[error("reward `{0}` is not available")]
    UnknownReward(String),

    /// The engine returned home while this operation was in flight.
    #[error("superseded by a return to the home page")]
    Superseded,
}

/// Result of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The state changed; carries the new snapshot.
    Applied(NavigationState),
    /// Nothing changed.
    Rejected(Rejection),
}

impl Transition {
    /// Whether the operation changed the state.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The new state, if the operation was applied.
    #[must_use]
    pub fn state(&self) -> Option<&NavigationState> {
        match self {
            Self::Applied(state) => Some(state),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if the operation was refused.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}
