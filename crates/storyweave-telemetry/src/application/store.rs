//! Session storage.

use std::collections::HashMap;

use async_trait::async_trait;
use storyweave_core::telemetry::SessionStats;
use tokio::sync::RwLock;

use crate::domain::session::{RewardDownload, StorySession};
use crate::error::ServiceError;

/// Persistence port for sessions and reward downloads.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Infrastructure` if the store fails.
    async fn load(&self, session_id: &str) -> Result<Option<StorySession>, ServiceError>;

    /// Saves a session loaded at version `session.version`, bumping the
    /// version. A new session is saved with version 0.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ConcurrencyConflict` if the stored version
    /// moved on, or `ServiceError::Infrastructure` if the store fails.
    async fn save(&self, session: StorySession) -> Result<StorySession, ServiceError>;

    /// Appends a reward download.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Infrastructure` if the store fails.
    async fn save_download(&self, download: RewardDownload) -> Result<(), ServiceError>;

    /// Downloads recorded for a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Infrastructure` if the store fails.
    async fn downloads(&self, session_id: &str) -> Result<Vec<RewardDownload>, ServiceError>;

    /// Session counters across the whole store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Infrastructure` if the store fails.
    async fn stats(&self) -> Result<SessionStats, ServiceError>;
}

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<String, StorySession>,
    downloads: Vec<RewardDownload>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    tables: RwLock<Tables>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<StorySession>, ServiceError> {
        Ok(self.tables.read().await.sessions.get(session_id).cloned())
    }

    async fn save(&self, mut session: StorySession) -> Result<StorySession, ServiceError> {
        let mut tables = self.tables.write().await;
        let actual = tables
            .sessions
            .get(&session.session_id)
            .map_or(0, |stored| stored.version);
        let is_new = !tables.sessions.contains_key(&session.session_id);
        if !is_new && actual != session.version {
            return Err(ServiceError::ConcurrencyConflict {
                session_id: session.session_id,
                expected: session.version,
                actual,
            });
        }

        session.version += 1;
        tables
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn save_download(&self, download: RewardDownload) -> Result<(), ServiceError> {
        self.tables.write().await.downloads.push(download);
        Ok(())
    }

    async fn downloads(&self, session_id: &str) -> Result<Vec<RewardDownload>, ServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .downloads
            .iter()
            .filter(|d| d.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<SessionStats, ServiceError> {
        let tables = self.tables.read().await;
        Ok(SessionStats {
            total_sessions: tables.sessions.len() as u64,
            completed_sessions: tables
                .sessions
                .values()
                .filter(|s| s.is_completed())
                .count() as u64,
        })
    }
}
