//! Reward resolution for endings.

use super::document::{Ending, Reward};
use super::graph::StoryGraph;

impl StoryGraph {
    /// Rewards to present for `ending`: the ones it names (in listed order,
    /// unknown ids skipped) or, when it names none, every default reward.
    #[must_use]
    pub fn rewards_for(&self, ending: &Ending) -> Vec<&Reward> {
        if ending.rewards.is_empty() {
            return self.rewards().iter().filter(|r| r.is_default).collect();
        }
        ending
            .rewards
            .iter()
            .filter_map(|id| self.reward(id))
            .collect()
    }
}
