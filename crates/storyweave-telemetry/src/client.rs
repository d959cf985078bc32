//! HTTP client for the telemetry service.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use storyweave_core::error::StoryError;
use storyweave_core::telemetry::{ChoiceRecord, SessionStats, TelemetryClient};
use tracing::debug;

use crate::wire::{
    AckResponse, CompleteSessionRequest, ErrorResponse, RecordChoiceRequest,
    RewardDownloadRequest, StartSessionRequest, StartSessionResponse, StatsResponse,
};

/// [`TelemetryClient`] backed by the companion HTTP service.
#[derive(Debug, Clone)]
pub struct HttpTelemetryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTelemetryClient {
    /// Creates a client for the service at `base_url` (e.g.
    /// `http://localhost:5000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client using an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    /// The service root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, StoryError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| StoryError::Telemetry(e.to_string()))?;
        read_body(path, response).await
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, StoryError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| StoryError::Telemetry(e.to_string()))?;
        read_body(path, response).await
    }
}

async fn read_body<R: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<R, StoryError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message.unwrap_or(e.error))
            .unwrap_or(body);
        return Err(StoryError::Telemetry(format!("{path}: {status}: {detail}")));
    }
    debug!(path, %status, "telemetry call succeeded");
    response
        .json()
        .await
        .map_err(|e| StoryError::Telemetry(format!("{path}: invalid response: {e}")))
}

fn ensure_success(path: &str, success: bool) -> Result<(), StoryError> {
    if success {
        Ok(())
    } else {
        Err(StoryError::Telemetry(format!("{path}: service reported failure")))
    }
}

#[async_trait]
impl TelemetryClient for HttpTelemetryClient {
    async fn start_session(&self, player_name: &str) -> Result<String, StoryError> {
        let request = StartSessionRequest {
            player_name: Some(player_name.to_owned()),
        };
        let response: StartSessionResponse = self.post("/api/session", &request).await?;
        ensure_success("/api/session", response.success)?;
        Ok(response.session_id)
    }

    async fn record_choice(&self, record: &ChoiceRecord) -> Result<(), StoryError> {
        let request = RecordChoiceRequest {
            session_id: record.session_id.clone(),
            scene_id: record.scene_id.clone(),
            choice_text: record.choice_text.clone(),
            next_scene_id: record.next_scene_id.clone(),
            choice_order: Some(record.choice_order),
        };
        let response: AckResponse = self.post("/api/story/choice", &request).await?;
        ensure_success("/api/story/choice", response.success)
    }

    async fn complete_session(&self, session_id: &str, ending_id: &str) -> Result<(), StoryError> {
        let request = CompleteSessionRequest {
            session_id: session_id.to_owned(),
            ending_id: Some(ending_id.to_owned()),
        };
        let response: AckResponse = self.post("/api/story/complete", &request).await?;
        ensure_success("/api/story/complete", response.success)
    }

    async fn record_reward_download(
        &self,
        session_id: &str,
        reward_id: &str,
        reward_title: &str,
    ) -> Result<(), StoryError> {
        let request = RewardDownloadRequest {
            session_id: session_id.to_owned(),
            reward_id: reward_id.to_owned(),
            reward_title: reward_title.to_owned(),
        };
        let response: AckResponse = self.post("/api/rewards/download", &request).await?;
        ensure_success("/api/rewards/download", response.success)
    }

    async fn get_stats(&self, session_id: &str) -> Result<SessionStats, StoryError> {
        let response: StatsResponse = self
            .get("/api/story/stats", &[("sessionId", session_id)])
            .await?;
        ensure_success("/api/story/stats", response.success)?;
        Ok(response.stats)
    }
}
