//! Story document source abstraction.

use std::fmt;

use async_trait::async_trait;

use crate::error::StoryError;

/// Serialization format of a raw story document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// JSON, the default wire format.
    #[default]
    Json,
    /// YAML, accepted for hand-authored stories.
    Yaml,
}

impl DocumentFormat {
    /// Guesses the format from a path or URL by its extension.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Self::Yaml
        } else {
            Self::Json
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

/// An undecoded story document as fetched from its source.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Where the document came from (path or URL), for diagnostics.
    pub origin: String,
    /// How the body is encoded.
    pub format: DocumentFormat,
    /// The document body.
    pub body: String,
}

/// Where story documents come from.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Fetches the raw document.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Transport` on I/O or network failure and
    /// `StoryError::DocumentNotFound` when the document does not exist.
    async fn fetch(&self) -> Result<RawDocument, StoryError>;

    /// A short description of the source for logs.
    fn describe(&self) -> String;
}
