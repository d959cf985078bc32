//! The immutable, id-indexed story graph.

use std::collections::HashMap;

use storyweave_core::error::StoryError;

use super::document::{Ending, Reward, Scene, StoryDocument};
use super::validation::{self, LoadWarning};

/// Scenes, endings and rewards of one story, indexed by id.
///
/// Built once per load and never mutated afterwards; share it as
/// `Arc<StoryGraph>`. When ids are duplicated the first occurrence wins.
#[derive(Debug)]
pub struct StoryGraph {
    scenes: Vec<Scene>,
    endings: Vec<Ending>,
    rewards: Vec<Reward>,
    scene_index: HashMap<String, usize>,
    ending_index: HashMap<String, usize>,
    reward_index: HashMap<String, usize>,
    start: usize,
    warnings: Vec<LoadWarning>,
    origin: String,
    version_hash: String,
}

impl StoryGraph {
    /// Builds the graph from a decoded document.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::MissingStartScene` if no scene is flagged as the
    /// start, or `StoryError::Schema` if several are.
    pub fn from_document(
        document: StoryDocument,
        origin: impl Into<String>,
        version_hash: impl Into<String>,
    ) -> Result<Self, StoryError> {
        let start = validation::find_start_scene(&document.scenes)?;
        let warnings =
            validation::check_references(&document.scenes, &document.endings, &document.rewards);

        Ok(Self {
            scene_index: index_by_id(document.scenes.iter().map(|s| s.id.as_str())),
            ending_index: index_by_id(document.endings.iter().map(|e| e.id.as_str())),
            reward_index: index_by_id(document.rewards.iter().map(|r| r.id.as_str())),
            scenes: document.scenes,
            endings: document.endings,
            rewards: document.rewards,
            start,
            warnings,
            origin: origin.into(),
            version_hash: version_hash.into(),
        })
    }

    /// The scene flagged `isStart`.
    #[must_use]
    pub fn start_scene(&self) -> &Scene {
        &self.scenes[self.start]
    }

    /// Looks up a scene by id.
    #[must_use]
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scene_index.get(id).map(|&i| &self.scenes[i])
    }

    /// Looks up an ending by id.
    #[must_use]
    pub fn ending(&self, id: &str) -> Option<&Ending> {
        self.ending_index.get(id).map(|&i| &self.endings[i])
    }

    /// Looks up a reward by id.
    #[must_use]
    pub fn reward(&self, id: &str) -> Option<&Reward> {
        self.reward_index.get(id).map(|&i| &self.rewards[i])
    }

    /// All scenes in document order.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// All endings in document order.
    #[must_use]
    pub fn endings(&self) -> &[Ending] {
        &self.endings
    }

    /// All rewards in document order.
    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Advisory problems found at load time.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Where the document was loaded from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// SHA-256 of the raw document body, hex encoded.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (position, id) in ids.enumerate() {
        index.entry(id.to_owned()).or_insert(position);
    }
    index
}
