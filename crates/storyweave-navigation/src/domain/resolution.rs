//! Resolving where a choice or a terminal scene leads.
//!
//! Dangling references are tolerated at load time and fail here, at the
//! moment the reader follows them.

use storyweave_core::error::{ReferenceTarget, StoryError};
use storyweave_story::domain::document::{Choice, ChoiceTarget, Ending, Scene};
use storyweave_story::domain::graph::StoryGraph;

/// A resolved destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination<'a> {
    /// Another scene.
    Scene(&'a Scene),
    /// An ending.
    Ending(&'a Ending),
}

/// Resolves choice `index` of `scene_id`.
///
/// # Errors
///
/// Returns `StoryError::BrokenReference` when the target id is unknown, and
/// `StoryError::DeadEnd` when the choice has no target.
pub fn follow_choice<'a>(
    graph: &'a StoryGraph,
    scene_id: &str,
    index: usize,
    choice: &Choice,
) -> Result<Destination<'a>, StoryError> {
    match choice.target() {
        Some(ChoiceTarget::Ending(id)) => ending(graph, scene_id, id),
        Some(ChoiceTarget::Scene(id)) => graph
            .scene(id)
            .map(Destination::Scene)
            .ok_or_else(|| StoryError::BrokenReference {
                target: ReferenceTarget::Scene,
                id: id.to_owned(),
                scene_id: scene_id.to_owned(),
            }),
        None => Err(StoryError::DeadEnd {
            scene_id: scene_id.to_owned(),
            choice_index: Some(index),
        }),
    }
}

/// Resolves the ending of a scene without choices.
///
/// # Errors
///
/// Returns `StoryError::BrokenReference` when the ending id is unknown, and
/// `StoryError::DeadEnd` when the scene names no ending.
pub fn follow_terminal<'a>(
    graph: &'a StoryGraph,
    scene: &Scene,
) -> Result<Destination<'a>, StoryError> {
    match &scene.ending {
        Some(id) => ending(graph, &scene.id, id),
        None => Err(StoryError::DeadEnd {
            scene_id: scene.id.clone(),
            choice_index: None,
        }),
    }
}

fn ending<'a>(
    graph: &'a StoryGraph,
    scene_id: &str,
    id: &str,
) -> Result<Destination<'a>, StoryError> {
    graph
        .ending(id)
        .map(Destination::Ending)
        .ok_or_else(|| StoryError::BrokenReference {
            target: ReferenceTarget::Ending,
            id: id.to_owned(),
            scene_id: scene_id.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use storyweave_core::error::ErrorKind;
    use storyweave_story::domain::document::StoryDocument;
    use storyweave_test_support::fixtures;

    use super::*;

    fn graph(json: &str) -> StoryGraph {
        let document: StoryDocument = serde_json::from_str(json).unwrap();
        StoryGraph::from_document(document, "memory://story", "hash").unwrap()
    }

    fn first_choice(graph: &StoryGraph, scene_id: &str, index: usize) -> Choice {
        graph.scene(scene_id).unwrap().choices[index].clone()
    }

    #[test]
    fn test_choice_to_scene_and_ending() {
        let graph = graph(&fixtures::branching_story());

        let to_cafe = follow_choice(&graph, "meet", 0, &first_choice(&graph, "meet", 0)).unwrap();
        let to_cozy = follow_choice(&graph, "meet", 2, &first_choice(&graph, "meet", 2)).unwrap();

        assert!(matches!(to_cafe, Destination::Scene(scene) if scene.id == "cafe"));
        assert!(matches!(to_cozy, Destination::Ending(ending) if ending.id == "cozy"));
    }

    #[test]
    fn test_dangling_scene_is_broken_reference() {
        let graph = graph(&fixtures::dangling_scene_story());

        let err = follow_choice(&graph, "A", 0, &first_choice(&graph, "A", 0)).unwrap_err();

        assert!(matches!(
            err,
            StoryError::BrokenReference { target: ReferenceTarget::Scene, ref id, .. } if id == "Z"
        ));
    }

    #[test]
    fn test_dangling_ending_is_broken_reference() {
        let graph = graph(&fixtures::dangling_ending_story());

        let err = follow_choice(&graph, "A", 0, &first_choice(&graph, "A", 0)).unwrap_err();

        assert!(matches!(
            err,
            StoryError::BrokenReference { target: ReferenceTarget::Ending, .. }
        ));
    }

    #[test]
    fn test_choice_without_target_is_dead_end() {
        let graph = graph(&fixtures::dead_end_story());

        let err = follow_choice(&graph, "A", 0, &first_choice(&graph, "A", 0)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadEnd);
    }

    #[test]
    fn test_terminal_scene_leads_to_its_ending() {
        let graph = graph(&fixtures::branching_story());
        let park = graph.scene("park").unwrap();

        let destination = follow_terminal(&graph, park).unwrap();

        assert!(matches!(destination, Destination::Ending(ending) if ending.id == "sunset"));
    }

    #[test]
    fn test_scene_without_exit_is_dead_end() {
        let graph = graph(&fixtures::dead_end_story());
        let b = graph.scene("B").unwrap();

        let err = follow_terminal(&graph, b).unwrap_err();

        assert!(matches!(err, StoryError::DeadEnd { choice_index: None, .. }));
    }
}
