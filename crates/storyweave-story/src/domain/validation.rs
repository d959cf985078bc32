//! Structural and referential validation of story documents.
//!
//! Structural problems are fatal and reported as `StoryError`s. Referential
//! problems (ids that do not resolve) are advisory: they become
//! [`LoadWarning`]s and only fail a transition if the reader actually follows
//! the broken reference.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use storyweave_core::error::StoryError;

use super::document::{Ending, Reward, Scene};

/// Collections every story document must carry at its root.
const REQUIRED_COLLECTIONS: [&str; 3] = ["scenes", "endings", "rewards"];

/// A non-fatal defect found while loading a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Two entities of the same kind share an id; the first one wins.
    DuplicateId {
        /// `"scene"`, `"ending"` or `"reward"`.
        kind: &'static str,
        /// The repeated id.
        id: String,
    },
    /// A choice's `nextScene` does not resolve.
    UnknownScene {
        /// Scene holding the choice.
        scene_id: String,
        /// Index of the choice within the scene.
        choice_index: usize,
        /// The unresolved id.
        target: String,
    },
    /// A choice's or a terminal scene's `ending` does not resolve.
    UnknownEnding {
        /// Scene holding the reference.
        scene_id: String,
        /// Index of the choice, `None` for the scene's own `ending`.
        choice_index: Option<usize>,
        /// The unresolved id.
        target: String,
    },
    /// A choice sets neither `nextScene` nor `ending`.
    ChoiceWithoutTarget {
        /// Scene holding the choice.
        scene_id: String,
        /// Index of the choice within the scene.
        choice_index: usize,
    },
    /// A choice sets both `nextScene` and `ending`; the ending wins.
    ChoiceWithBothTargets {
        /// Scene holding the choice.
        scene_id: String,
        /// Index of the choice within the scene.
        choice_index: usize,
    },
    /// A scene has no choices and no ending.
    SceneWithoutExit {
        /// The scene.
        scene_id: String,
    },
    /// An ending lists a reward id that does not resolve.
    UnknownReward {
        /// The ending.
        ending_id: String,
        /// The unresolved reward id.
        reward_id: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id \"{id}\""),
            Self::UnknownScene {
                scene_id,
                choice_index,
                target,
            } => write!(
                f,
                "scene \"{scene_id}\" choice {choice_index} references unknown scene \"{target}\""
            ),
            Self::UnknownEnding {
                scene_id,
                choice_index: Some(index),
                target,
            } => write!(
                f,
                "scene \"{scene_id}\" choice {index} references unknown ending \"{target}\""
            ),
            Self::UnknownEnding {
                scene_id,
                choice_index: None,
                target,
            } => write!(f, "scene \"{scene_id}\" references unknown ending \"{target}\""),
            Self::ChoiceWithoutTarget {
                scene_id,
                choice_index,
            } => write!(
                f,
                "scene \"{scene_id}\" choice {choice_index} has neither nextScene nor ending"
            ),
            Self::ChoiceWithBothTargets {
                scene_id,
                choice_index,
            } => write!(
                f,
                "scene \"{scene_id}\" choice {choice_index} has both nextScene and ending; ending wins"
            ),
            Self::SceneWithoutExit { scene_id } => {
                write!(f, "scene \"{scene_id}\" has no choices and no ending")
            }
            Self::UnknownReward {
                ending_id,
                reward_id,
            } => write!(
                f,
                "ending \"{ending_id}\" references unknown reward \"{reward_id}\""
            ),
        }
    }
}

/// Checks the document root before typed decoding: it must be a mapping
/// carrying `scenes` (a non-empty array), `endings` and `rewards` (arrays).
///
/// # Errors
///
/// Returns `StoryError::Format` if the root is not a mapping and
/// `StoryError::Schema` naming the first offending field otherwise.
pub fn check_schema(root: &Value) -> Result<(), StoryError> {
    let Some(object) = root.as_object() else {
        return Err(StoryError::Format(
            "document root must be a mapping".to_owned(),
        ));
    };

    for field in REQUIRED_COLLECTIONS {
        match object.get(field) {
            None => {
                return Err(StoryError::Schema {
                    field,
                    detail: "field is missing".to_owned(),
                });
            }
            Some(Value::Array(items)) => {
                if field == "scenes" && items.is_empty() {
                    return Err(StoryError::Schema {
                        field,
                        detail: "must contain at least one scene".to_owned(),
                    });
                }
            }
            Some(_) => {
                return Err(StoryError::Schema {
                    field,
                    detail: "must be an array".to_owned(),
                });
            }
        }
    }

    Ok(())
}

/// Finds the index of the single scene flagged `isStart`.
///
/// # Errors
///
/// Returns `StoryError::MissingStartScene` if none is flagged and
/// `StoryError::Schema` on field `isStart` if more than one is, or if an
/// earlier scene reuses the start scene's id.
pub fn find_start_scene(scenes: &[Scene]) -> Result<usize, StoryError> {
    let mut starts = scenes
        .iter()
        .enumerate()
        .filter(|(_, scene)| scene.is_start);

    let Some((index, first)) = starts.next() else {
        return Err(StoryError::MissingStartScene);
    };

    if let Some((_, second)) = starts.next() {
        return Err(StoryError::Schema {
            field: "isStart",
            detail: format!(
                "scenes \"{}\" and \"{}\" are both flagged as the start scene",
                first.id, second.id
            ),
        });
    }

    if scenes[..index].iter().any(|scene| scene.id == first.id) {
        return Err(StoryError::Schema {
            field: "isStart",
            detail: format!(
                "start scene \"{}\" is shadowed by an earlier scene with the same id",
                first.id
            ),
        });
    }

    Ok(index)
}

/// Runs the advisory checks over a decoded document.
#[must_use]
pub fn check_references(scenes: &[Scene], endings: &[Ending], rewards: &[Reward]) -> Vec<LoadWarning> {
    let mut warnings = Vec::new();

    let scene_ids = collect_ids("scene", scenes.iter().map(|s| s.id.as_str()), &mut warnings);
    let ending_ids = collect_ids("ending", endings.iter().map(|e| e.id.as_str()), &mut warnings);
    let reward_ids = collect_ids("reward", rewards.iter().map(|r| r.id.as_str()), &mut warnings);

    for scene in scenes {
        if scene.choices.is_empty() && scene.ending.is_none() {
            warnings.push(LoadWarning::SceneWithoutExit {
                scene_id: scene.id.clone(),
            });
        }

        if let Some(ending) = &scene.ending {
            if !ending_ids.contains(ending.as_str()) {
                warnings.push(LoadWarning::UnknownEnding {
                    scene_id: scene.id.clone(),
                    choice_index: None,
                    target: ending.clone(),
                });
            }
        }

        for (index, choice) in scene.choices.iter().enumerate() {
            match (&choice.next_scene, &choice.ending) {
                (None, None) => warnings.push(LoadWarning::ChoiceWithoutTarget {
                    scene_id: scene.id.clone(),
                    choice_index: index,
                }),
                (Some(_), Some(_)) => warnings.push(LoadWarning::ChoiceWithBothTargets {
                    scene_id: scene.id.clone(),
                    choice_index: index,
                }),
                _ => {}
            }

            if let Some(next) = &choice.next_scene {
                if !scene_ids.contains(next.as_str()) {
                    warnings.push(LoadWarning::UnknownScene {
                        scene_id: scene.id.clone(),
                        choice_index: index,
                        target: next.clone(),
                    });
                }
            }

            if let Some(ending) = &choice.ending {
                if !ending_ids.contains(ending.as_str()) {
                    warnings.push(LoadWarning::UnknownEnding {
                        scene_id: scene.id.clone(),
                        choice_index: Some(index),
                        target: ending.clone(),
                    });
                }
            }
        }
    }

    for ending in endings {
        for reward_id in &ending.rewards {
            if !reward_ids.contains(reward_id.as_str()) {
                warnings.push(LoadWarning::UnknownReward {
                    ending_id: ending.id.clone(),
                    reward_id: reward_id.clone(),
                });
            }
        }
    }

    warnings
}

fn collect_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<LoadWarning>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warnings.push(LoadWarning::DuplicateId {
                kind,
                id: id.to_owned(),
            });
        }
    }
    seen
}
