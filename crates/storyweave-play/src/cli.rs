//! Command-line arguments.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use storyweave_core::source::StorySource;
use storyweave_core::telemetry::TelemetryClient;
use storyweave_navigation::application::engine::{
    DEFAULT_PLAYER_NAME, DEFAULT_TELEMETRY_TIMEOUT, EngineConfig,
};
use storyweave_story::application::sources::{FileStorySource, HttpStorySource};
use storyweave_telemetry::client::HttpTelemetryClient;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "storyweave-play")]
#[command(about = "Read a Storyweave story in the terminal")]
pub struct Cli {
    /// Story document: a file path or an http(s) URL
    #[arg(long, env = "STORY_SOURCE", default_value = "story.json")]
    pub story: String,

    /// Base URL of the telemetry service; tracking is off when absent
    #[arg(long, env = "TELEMETRY_URL")]
    pub telemetry_url: Option<String>,

    /// Name reported when a reading session starts
    #[arg(long, default_value = DEFAULT_PLAYER_NAME)]
    pub player_name: String,

    /// Upper bound for each telemetry call, in milliseconds
    #[arg(long, default_value_t = default_timeout_ms())]
    pub telemetry_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_TELEMETRY_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

impl Cli {
    /// Engine settings derived from the arguments.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            player_name: self.player_name.clone(),
            telemetry_timeout: Duration::from_millis(self.telemetry_timeout_ms),
        }
    }

    /// The story source named by `--story`.
    #[must_use]
    pub fn story_source(&self) -> Arc<dyn StorySource> {
        if is_url(&self.story) {
            Arc::new(HttpStorySource::new(self.story.clone()))
        } else {
            Arc::new(FileStorySource::new(&self.story))
        }
    }

    /// The telemetry client, when `--telemetry-url` was given.
    #[must_use]
    pub fn telemetry(&self) -> Option<Arc<dyn TelemetryClient>> {
        self.telemetry_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Arc::new(HttpTelemetryClient::new(url)) as Arc<dyn TelemetryClient>)
    }

    /// Where a reward file lives: next to the story document.
    #[must_use]
    pub fn asset_location(&self, file: &str) -> String {
        if is_url(&self.story) {
            let base = self
                .story
                .rsplit_once('/')
                .map_or(self.story.as_str(), |(base, _)| base);
            format!("{base}/{}", file.trim_start_matches('/'))
        } else {
            let root = PathBuf::from(&self.story)
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            root.join(file).display().to_string()
        }
    }
}
