//! Error taxonomy for loading and navigating a story.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// What kind of entity a broken reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTarget {
    /// A `nextScene` reference.
    Scene,
    /// An `ending` reference on a choice or a terminal scene.
    Ending,
}

impl fmt::Display for ReferenceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene => f.write_str("scene"),
            Self::Ending => f.write_str("ending"),
        }
    }
}

/// Every failure the loader, the engine or a telemetry client can report.
#[derive(Debug, Clone, Error)]
pub enum StoryError {
    /// The story document could not be fetched.
    #[error("transport error: {0}")]
    Transport(String),

    /// The story document does not exist at its source.
    #[error("story document not found: {0}")]
    DocumentNotFound(String),

    /// The story document body was empty.
    #[error("story document is empty")]
    Empty,

    /// The story document is not well-formed.
    #[error("malformed story document: {0}")]
    Format(String),

    /// A required top-level field is missing or has the wrong shape.
    #[error("schema error in `{field}`: {detail}")]
    Schema {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        detail: String,
    },

    /// No scene is flagged `isStart`.
    #[error("story has no start scene")]
    MissingStartScene,

    /// A choice or terminal scene points at an id that is not in the graph.
    #[error("scene `{scene_id}` references unknown {target} `{id}`")]
    BrokenReference {
        /// Whether a scene or an ending was expected.
        target: ReferenceTarget,
        /// The unresolved id.
        id: String,
        /// The scene the reference was followed from.
        scene_id: String,
    },

    /// A choice (or a choiceless scene) leads nowhere.
    #[error("scene `{scene_id}` has a dead end{}", .choice_index.map(|i| format!(" at choice {i}")).unwrap_or_default())]
    DeadEnd {
        /// The scene the reader was on.
        scene_id: String,
        /// The choice index, `None` when the scene itself has no exit.
        choice_index: Option<usize>,
    },

    /// A telemetry call did not finish within its budget.
    #[error("telemetry `{operation}` timed out after {after:?}")]
    TelemetryTimeout {
        /// The telemetry operation that was abandoned.
        operation: &'static str,
        /// The budget that elapsed.
        after: Duration,
    },

    /// A telemetry call failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Fieldless mirror of [`StoryError`], carried in navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`StoryError::Transport`].
    Transport,
    /// See [`StoryError::DocumentNotFound`].
    DocumentNotFound,
    /// See [`StoryError::Empty`].
    Empty,
    /// See [`StoryError::Format`].
    Format,
    /// See [`StoryError::Schema`].
    Schema,
    /// See [`StoryError::MissingStartScene`].
    MissingStartScene,
    /// See [`StoryError::BrokenReference`].
    BrokenReference,
    /// See [`StoryError::DeadEnd`].
    DeadEnd,
    /// See [`StoryError::TelemetryTimeout`].
    TelemetryTimeout,
    /// See [`StoryError::Telemetry`].
    Telemetry,
}

impl StoryError {
    /// Returns the fieldless kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::DocumentNotFound(_) => ErrorKind::DocumentNotFound,
            Self::Empty => ErrorKind::Empty,
            Self::Format(_) => ErrorKind::Format,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::MissingStartScene => ErrorKind::MissingStartScene,
            Self::BrokenReference { .. } => ErrorKind::BrokenReference,
            Self::DeadEnd { .. } => ErrorKind::DeadEnd,
            Self::TelemetryTimeout { .. } => ErrorKind::TelemetryTimeout,
            Self::Telemetry(_) => ErrorKind::Telemetry,
        }
    }

    /// Returns `true` for errors that must never reach the reader.
    #[must_use]
    pub fn is_telemetry(&self) -> bool {
        matches!(self, Self::TelemetryTimeout { .. } | Self::Telemetry(_))
    }

    /// Human-readable message shown on the error page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Unable to load the story file. Please check your internet connection and try again.".to_owned(),
            Self::DocumentNotFound(_) => "The story file could not be found. Please ensure all files are properly uploaded.".to_owned(),
            Self::Empty => "The story file is empty. Please check the story file contents.".to_owned(),
            Self::Format(_) => "The story file appears to be corrupted. Please check the story file format.".to_owned(),
            Self::Schema { field, .. } => format!("The story file is missing required information (`{field}`). Please check the story configuration."),
            Self::MissingStartScene => "Could not find the starting scene of the story. Please check the story configuration.".to_owned(),
            Self::BrokenReference { target, id, .. } => format!("The {target} \"{id}\" could not be found. The story may have a configuration error."),
            Self::DeadEnd { .. } => "This choice does not lead anywhere. Please contact support.".to_owned(),
            Self::TelemetryTimeout { .. } | Self::Telemetry(_) => "Progress tracking is unavailable right now.".to_owned(),
        }
    }
}
