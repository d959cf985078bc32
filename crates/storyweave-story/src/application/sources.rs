//! Concrete story sources: local files and HTTP.

use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use storyweave_core::error::StoryError;
use storyweave_core::source::{DocumentFormat, RawDocument, StorySource};
use tracing::debug;

/// Reads the story document from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStorySource {
    path: PathBuf,
}

impl FileStorySource {
    /// Creates a source for the document at `path`. The format follows the
    /// file extension (`.yaml`/`.yml` for YAML, JSON otherwise).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StorySource for FileStorySource {
    async fn fetch(&self) -> Result<RawDocument, StoryError> {
        let origin = self.path.display().to_string();
        debug!(%origin, "reading story document");

        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                IoErrorKind::NotFound => StoryError::DocumentNotFound(origin.clone()),
                IoErrorKind::InvalidData => StoryError::Format(format!("{origin}: not valid UTF-8")),
                _ => StoryError::Transport(format!("{origin}: {e}")),
            })?;

        Ok(RawDocument {
            format: DocumentFormat::from_path(&origin),
            origin,
            body,
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches the story document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStorySource {
    client: reqwest::Client,
    url: String,
}

impl HttpStorySource {
    /// Creates a source fetching `url` with a default client.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a source fetching `url` with the given client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl StorySource for HttpStorySource {
    async fn fetch(&self) -> Result<RawDocument, StoryError> {
        debug!(url = %self.url, "fetching story document");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| StoryError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoryError::DocumentNotFound(self.url.clone()));
        }
        if !status.is_success() {
            return Err(StoryError::Transport(format!(
                "failed to load story: {status}"
            )));
        }

        let is_yaml = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("yaml"));
        let format = if is_yaml {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::from_path(&self.url)
        };

        let body = response
            .text()
            .await
            .map_err(|e| StoryError::Transport(e.to_string()))?;

        Ok(RawDocument {
            origin: self.url.clone(),
            format,
            body,
        })
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use storyweave_core::error::ErrorKind;
    use storyweave_core::source::{DocumentFormat, StorySource};
    use storyweave_test_support::fixtures;

    use super::FileStorySource;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storyweave-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_file_source_reads_document_and_detects_format() {
        // Arrange
        let path = temp_path("story.yaml");
        tokio::fs::write(&path, fixtures::linear_story_yaml()).await.unwrap();
        let source = FileStorySource::new(&path);

        // Act
        let raw = source.fetch().await.unwrap();

        // Assert
        assert_eq!(raw.format, DocumentFormat::Yaml);
        assert_eq!(raw.body, fixtures::linear_story_yaml());
        assert!(raw.origin.ends_with("story.yaml"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source_non_utf8_body_is_format_error() {
        // Arrange
        let path = temp_path("garbled.json");
        tokio::fs::write(&path, b"{\"scenes\": [\xff\xfe]}").await.unwrap();
        let source = FileStorySource::new(&path);

        // Act
        let err = source.fetch().await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("not valid UTF-8"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_document_not_found() {
        let source = FileStorySource::new(temp_path("does-not-exist.json"));

        let err = source.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
    }
}
