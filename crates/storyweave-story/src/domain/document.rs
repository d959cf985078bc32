//! Story document schema.
//!
//! These types are the wire contract for story documents and double as the
//! in-memory entities of the story graph. Field names are camelCase on the
//! wire; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A fully decoded story document, before indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    /// All scenes, in document order.
    pub scenes: Vec<Scene>,
    /// All endings, in document order.
    pub endings: Vec<Ending>,
    /// All rewards, in document order.
    pub rewards: Vec<Reward>,
}

/// A narrative unit with displayed content and zero or more choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Unique scene identifier.
    pub id: String,
    /// Scene title.
    pub title: String,
    /// Scene body text; lines separate paragraphs.
    pub content: String,
    /// Whether the story begins here.
    #[serde(default)]
    pub is_start: bool,
    /// Options offered to the reader.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Ending reached directly from this scene when it has no choices.
    #[serde(default)]
    pub ending: Option<String>,
}

impl Scene {
    /// A terminal scene has no choices and leads straight to an ending.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty() && self.ending.is_some()
    }

    /// Content split into trimmed, non-empty paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        split_paragraphs(&self.content)
    }
}

/// Where a choice leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceTarget<'a> {
    /// Another scene.
    Scene(&'a str),
    /// An ending.
    Ending(&'a str),
}

/// A user-selectable option attached to a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Label shown to the reader.
    pub text: String,
    /// Scene this choice leads to.
    #[serde(default)]
    pub next_scene: Option<String>,
    /// Ending this choice leads to.
    #[serde(default)]
    pub ending: Option<String>,
}

impl Choice {
    /// Resolves the target of this choice. An ending wins over a scene when
    /// both are set; `None` means the choice leads nowhere.
    #[must_use]
    pub fn target(&self) -> Option<ChoiceTarget<'_>> {
        match (&self.ending, &self.next_scene) {
            (Some(ending), _) => Some(ChoiceTarget::Ending(ending)),
            (None, Some(scene)) => Some(ChoiceTarget::Scene(scene)),
            (None, None) => None,
        }
    }

    /// The id reported to telemetry as the choice's destination.
    #[must_use]
    pub fn destination_id(&self) -> Option<&str> {
        self.next_scene.as_deref().or(self.ending.as_deref())
    }
}

/// A terminal narrative unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ending {
    /// Unique ending identifier.
    pub id: String,
    /// Ending title.
    pub title: String,
    /// Closing message; lines separate paragraphs.
    pub message: String,
    /// Rewards unlocked by this ending. Empty means "the defaults".
    #[serde(default)]
    pub rewards: Vec<String>,
}

impl Ending {
    /// Message split into trimmed, non-empty paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        split_paragraphs(&self.message)
    }
}

/// A downloadable artifact unlocked by an ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Unique reward identifier.
    pub id: String,
    /// Reward title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Path of the artifact, relative to the asset root.
    pub file: String,
    /// Suggested download file name.
    #[serde(default)]
    pub filename: Option<String>,
    /// Offered when an ending names no rewards of its own.
    #[serde(default)]
    pub is_default: bool,
}

impl Reward {
    /// File name to save the artifact under.
    #[must_use]
    pub fn download_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.title)
    }
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
