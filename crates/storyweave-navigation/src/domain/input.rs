//! Input events accepted by the engine.

use storyweave_story::domain::document::Choice;

/// Identifies a choice on the current scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceRef {
    /// Zero-based position in the scene's choice list.
    Index(usize),
    /// Exact choice text.
    Text(String),
}

impl ChoiceRef {
    /// Finds the referenced choice and its index.
    #[must_use]
    pub fn find<'a>(&self, choices: &'a [Choice]) -> Option<(usize, &'a Choice)> {
        match self {
            Self::Index(index) => choices.get(*index).map(|choice| (*index, choice)),
            Self::Text(text) => choices
                .iter()
                .enumerate()
                .find(|(_, choice)| choice.text == *text),
        }
    }
}

impl From<usize> for ChoiceRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ChoiceRef {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Everything a presentation can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Begin the story from the home page.
    Start,
    /// Pick a choice on the current scene.
    SelectChoice(ChoiceRef),
    /// Move past a terminal scene to its ending.
    Continue,
    /// Start over from the first scene.
    Restart,
    /// Return to the home page.
    GoHome,
    /// Try again after an error.
    Retry,
    /// Download a reward of the ending reached.
    DownloadReward(String),
}
