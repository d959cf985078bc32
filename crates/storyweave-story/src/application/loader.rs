//! Story graph loader.
//!
//! Fetches a document from a [`StorySource`], decodes it, validates it and
//! builds the [`StoryGraph`]. The first successful graph is cached for the
//! lifetime of the loader; failures are not cached.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use storyweave_core::error::StoryError;
use storyweave_core::source::{DocumentFormat, RawDocument, StorySource};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::domain::document::StoryDocument;
use crate::domain::graph::StoryGraph;
use crate::domain::validation;

/// Loads and caches the story graph from one source.
pub struct StoryLoader {
    source: Arc<dyn StorySource>,
    cached: OnceCell<Arc<StoryGraph>>,
}

impl std::fmt::Debug for StoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryLoader")
            .field("source", &self.source.describe())
            .field("loaded", &self.cached.initialized())
            .finish()
    }
}

impl StoryLoader {
    /// Creates a loader for `source`. Nothing is fetched until [`Self::load`].
    #[must_use]
    pub fn new(source: Arc<dyn StorySource>) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    /// Returns the story graph, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns the `StoryError` of the failing stage: `Transport` or
    /// `DocumentNotFound` from the source, `Empty`, `Format`, `Schema` or
    /// `MissingStartScene` from decoding.
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub async fn load(&self) -> Result<Arc<StoryGraph>, StoryError> {
        if let Some(graph) = self.cached.get() {
            debug!("story graph served from cache");
            return Ok(Arc::clone(graph));
        }

        let graph = self
            .cached
            .get_or_try_init(|| async {
                let raw = self.source.fetch().await?;
                decode(&raw).map(Arc::new)
            })
            .await
            .inspect_err(|e| warn!(error = %e, "story load failed"))?;

        Ok(Arc::clone(graph))
    }

    /// The cached graph, if one was loaded.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<StoryGraph>> {
        self.cached.get().cloned()
    }
}

/// Decodes and validates a raw document into a story graph.
///
/// # Errors
///
/// Returns `StoryError::Empty` for a blank or null body, `StoryError::Format`
/// for syntax or per-entity structure problems, `StoryError::Schema` for
/// missing top-level collections and `StoryError::MissingStartScene` when no
/// scene is flagged as the start.
pub fn decode(raw: &RawDocument) -> Result<StoryGraph, StoryError> {
    if raw.body.trim().is_empty() {
        return Err(StoryError::Empty);
    }

    let root: Value = match raw.format {
        DocumentFormat::Json => serde_json::from_str(&raw.body)
            .map_err(|e| StoryError::Format(format!("invalid JSON: {e}")))?,
        DocumentFormat::Yaml => serde_yaml::from_str(&raw.body)
            .map_err(|e| StoryError::Format(format!("invalid YAML: {e}")))?,
    };
    if root.is_null() {
        return Err(StoryError::Empty);
    }

    validation::check_schema(&root)?;

    let document: StoryDocument =
        serde_json::from_value(root).map_err(|e| StoryError::Format(e.to_string()))?;

    let version_hash = format!("{:x}", Sha256::digest(raw.body.as_bytes()));
    let graph = StoryGraph::from_document(document, raw.origin.clone(), version_hash)?;

    for warning in graph.warnings() {
        warn!(origin = %graph.origin(), "{warning}");
    }
    info!(
        origin = %graph.origin(),
        format = %raw.format,
        version = %graph.version_hash(),
        scenes = graph.scenes().len(),
        endings = graph.endings().len(),
        rewards = graph.rewards().len(),
        warnings = graph.warnings().len(),
        "story graph loaded"
    );

    Ok(graph)
}
