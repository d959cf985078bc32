//! Test story sources — mock `StorySource` implementations for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storyweave_core::error::StoryError;
use storyweave_core::source::{DocumentFormat, RawDocument, StorySource};

/// A story source that serves a fixed body and counts how often it was
/// fetched, so tests can assert that a cached graph is not re-fetched.
#[derive(Debug)]
pub struct InMemoryStorySource {
    body: String,
    format: DocumentFormat,
    fetches: AtomicUsize,
}

impl InMemoryStorySource {
    /// Create a source serving a JSON body.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: DocumentFormat::Json,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Create a source serving a YAML body.
    #[must_use]
    pub fn yaml(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: DocumentFormat::Yaml,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorySource for InMemoryStorySource {
    async fn fetch(&self) -> Result<RawDocument, StoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(RawDocument {
            origin: "memory://story".to_owned(),
            format: self.format,
            body: self.body.clone(),
        })
    }

    fn describe(&self) -> String {
        "in-memory story".to_owned()
    }
}

/// A story source that always fails with the configured error.
#[derive(Debug)]
pub struct FailingStorySource {
    error: StoryError,
    fetches: AtomicUsize,
}

impl FailingStorySource {
    /// Create a source failing with `error` on every fetch.
    #[must_use]
    pub fn new(error: StoryError) -> Self {
        Self {
            error,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source that fails like an unreachable server.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(StoryError::Transport("connection refused".into()))
    }

    /// Number of `fetch` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorySource for FailingStorySource {
    async fn fetch(&self) -> Result<RawDocument, StoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn describe(&self) -> String {
        "failing story".to_owned()
    }
}
