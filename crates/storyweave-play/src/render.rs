//! Plain-text rendering of navigation snapshots.

use std::fmt::Write as _;

use storyweave_navigation::domain::state::{NavigationState, Phase};
use storyweave_story::domain::graph::StoryGraph;

/// Renders `state` against `graph` as the text shown to the reader.
///
/// The screen-reader announcement, when present, comes first in brackets.
#[must_use]
pub fn render(state: &NavigationState, graph: Option<&StoryGraph>) -> String {
    let mut out = String::new();
    if let Some(announcement) = &state.announcement {
        let _ = writeln!(out, "[{announcement}]");
    }

    match &state.phase {
        Phase::Idle => {
            out.push_str("Welcome. Press Enter to begin your story.\n");
        }
        Phase::Loading => {
            out.push_str("Loading your story...\n");
        }
        Phase::Ready | Phase::Transitioning => render_scene(&mut out, state, graph),
        Phase::Ended { ending_id } => render_ending(&mut out, ending_id, graph),
        Phase::Error { message, .. } => {
            let _ = writeln!(out, "Something went wrong: {message}");
            out.push_str("Type `retry` to try again or `home` to go back.\n");
        }
    }
    out
}

fn render_scene(out: &mut String, state: &NavigationState, graph: Option<&StoryGraph>) {
    let Some(scene) = state
        .current_scene
        .as_deref()
        .and_then(|id| graph?.scene(id))
    else {
        return;
    };

    let _ = writeln!(out, "== {} ==  (Scene {})", scene.title, state.progress());
    for paragraph in scene.paragraphs() {
        let _ = writeln!(out, "\n{paragraph}");
    }
    out.push('\n');

    if state.phase == Phase::Transitioning {
        out.push_str("...\n");
        return;
    }
    if scene.is_terminal() {
        out.push_str("(the story draws to a close)\n");
        return;
    }
    for (number, choice) in (1..).zip(&scene.choices) {
        let _ = writeln!(out, "  {number}. {}", choice.text);
    }
}

fn render_ending(out: &mut String, ending_id: &str, graph: Option<&StoryGraph>) {
    let Some((graph, ending)) = graph.and_then(|g| Some((g, g.ending(ending_id)?))) else {
        return;
    };

    let _ = writeln!(out, "== {} ==", ending.title);
    for paragraph in ending.paragraphs() {
        let _ = writeln!(out, "\n{paragraph}");
    }

    let rewards = graph.rewards_for(ending);
    if !rewards.is_empty() {
        out.push_str("\nYour rewards:\n");
        for reward in rewards {
            let _ = writeln!(out, "  [{}] {} - {}", reward.id, reward.title, reward.description);
        }
    }
    out.push_str("\nType `restart` to read again or `home` to leave.\n");
}
