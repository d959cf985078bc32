//! Story documents shared across test suites.

use serde_json::json;

/// Two scenes and one ending: `A` (start) → `B` → ending `E1`.
///
/// `E1` lists no rewards, so the default rewards apply.
#[must_use]
pub fn linear_story() -> String {
    json!({
        "scenes": [
            {
                "id": "A",
                "title": "The Letter",
                "content": "A letter waits on the table.\nIt smells of roses.",
                "isStart": true,
                "choices": [{ "text": "Open it", "nextScene": "B" }]
            },
            {
                "id": "B",
                "title": "The Garden",
                "content": "The letter asks you to meet in the garden.",
                "isStart": false,
                "choices": [{ "text": "Say yes", "ending": "E1" }]
            }
        ],
        "endings": [
            { "id": "E1", "title": "Together", "message": "And so it began." }
        ],
        "rewards": [
            {
                "id": "letter",
                "title": "Love Letter",
                "description": "A printable letter",
                "file": "rewards/letter.txt",
                "isDefault": true
            },
            {
                "id": "photo",
                "title": "Photo Album",
                "description": "Our favourite pictures",
                "file": "rewards/photos.txt",
                "isDefault": false
            }
        ]
    })
    .to_string()
}

/// A branching story with a loop, a terminal scene and reward fallbacks.
///
/// - `meet` (start): cafe → `cafe`, park → `park`, stay home → ending `cozy`
/// - `cafe`: cocoa → ending `sweet`, go back → `meet`
/// - `park`: terminal, ending `sunset`
/// - `sweet` rewards `[poem, playlist]`; `sunset` rewards `[ghost, playlist]`;
///   `cozy` has none, so the defaults `letter` and `photo` apply.
#[must_use]
pub fn branching_story() -> String {
    json!({
        "scenes": [
            {
                "id": "meet",
                "title": "First Meeting",
                "content": "You spot a familiar smile across the square.",
                "isStart": true,
                "choices": [
                    { "text": "Suggest the cafe", "nextScene": "cafe" },
                    { "text": "Suggest a walk in the park", "nextScene": "park" },
                    { "text": "Stay in tonight", "ending": "cozy" }
                ]
            },
            {
                "id": "cafe",
                "title": "The Cafe",
                "content": "Steam curls from two mugs.",
                "choices": [
                    { "text": "Order cocoa", "ending": "sweet" },
                    { "text": "Go back to the square", "nextScene": "meet" }
                ]
            },
            {
                "id": "park",
                "title": "The Park",
                "content": "The sun sets behind the trees.",
                "ending": "sunset"
            }
        ],
        "endings": [
            {
                "id": "sweet",
                "title": "Sweet Ending",
                "message": "Cocoa and conversation.",
                "rewards": ["poem", "playlist"]
            },
            {
                "id": "sunset",
                "title": "Sunset Ending",
                "message": "Golden light.",
                "rewards": ["ghost", "playlist"]
            },
            { "id": "cozy", "title": "Cozy Ending", "message": "Blankets and a movie." }
        ],
        "rewards": [
            { "id": "poem", "title": "Poem", "description": "A short poem", "file": "rewards/poem.txt" },
            { "id": "playlist", "title": "Playlist", "description": "Songs for the road", "file": "rewards/playlist.txt", "filename": "our-songs.txt" },
            { "id": "letter", "title": "Letter", "description": "A letter", "file": "rewards/letter.txt", "isDefault": true },
            { "id": "photo", "title": "Photo", "description": "A photo", "file": "rewards/photo.txt", "isDefault": true }
        ]
    })
    .to_string()
}

/// The start scene's only choice points at scene `Z`, which does not exist.
#[must_use]
pub fn dangling_scene_story() -> String {
    json!({
        "scenes": [
            {
                "id": "A",
                "title": "Start",
                "content": "Nowhere to go.",
                "isStart": true,
                "choices": [{ "text": "Step into the fog", "nextScene": "Z" }]
            }
        ],
        "endings": [],
        "rewards": []
    })
    .to_string()
}

/// The start scene's only choice points at ending `ghost`, which does not exist.
#[must_use]
pub fn dangling_ending_story() -> String {
    json!({
        "scenes": [
            {
                "id": "A",
                "title": "Start",
                "content": "A door with no room behind it.",
                "isStart": true,
                "choices": [{ "text": "Open the door", "ending": "ghost" }]
            }
        ],
        "endings": [],
        "rewards": []
    })
    .to_string()
}

/// Choice 0 of the start scene has no target; choice 1 leads to `B`, which
/// has neither choices nor an ending.
#[must_use]
pub fn dead_end_story() -> String {
    json!({
        "scenes": [
            {
                "id": "A",
                "title": "Start",
                "content": "Two paths.",
                "isStart": true,
                "choices": [
                    { "text": "Wander aimlessly" },
                    { "text": "Take the marked path", "nextScene": "B" }
                ]
            },
            { "id": "B", "title": "Clearing", "content": "Silence." }
        ],
        "endings": [],
        "rewards": []
    })
    .to_string()
}

/// A structurally valid story where no scene is flagged `isStart`.
#[must_use]
pub fn missing_start_story() -> String {
    json!({
        "scenes": [
            {
                "id": "A",
                "title": "Orphan",
                "content": "Nobody starts here.",
                "choices": [{ "text": "Finish", "ending": "E1" }]
            }
        ],
        "endings": [{ "id": "E1", "title": "End", "message": "Done." }],
        "rewards": []
    })
    .to_string()
}

/// [`linear_story`] written as YAML.
#[must_use]
pub fn linear_story_yaml() -> String {
    r"scenes:
  - id: A
    title: The Letter
    content: |
      A letter waits on the table.
      It smells of roses.
    isStart: true
    choices:
      - text: Open it
        nextScene: B
  - id: B
    title: The Garden
    content: The letter asks you to meet in the garden.
    choices:
      - text: Say yes
        ending: E1
endings:
  - id: E1
    title: Together
    message: And so it began.
rewards:
  - id: letter
    title: Love Letter
    description: A printable letter
    file: rewards/letter.txt
    isDefault: true
"
    .to_owned()
}
