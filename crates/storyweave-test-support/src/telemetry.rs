//! Test telemetry clients — mock `TelemetryClient` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use storyweave_core::error::StoryError;
use storyweave_core::telemetry::{ChoiceRecord, SessionStats, TelemetryClient};
use tokio::sync::watch;

/// Session id handed out by the test clients.
pub const TEST_SESSION_ID: &str = "session_1768471200000_test00001";

/// One call observed by [`RecordingTelemetry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryCall {
    /// `start_session(player_name)`.
    StartSession(String),
    /// `record_choice(record)`.
    RecordChoice(ChoiceRecord),
    /// `complete_session(session_id, ending_id)`.
    CompleteSession(String, String),
    /// `record_reward_download(session_id, reward_id, reward_title)`.
    RewardDownload(String, String, String),
    /// `get_stats(session_id)`.
    GetStats(String),
}

/// A telemetry client that records every call and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    calls: Mutex<Vec<TelemetryCall>>,
}

impl RecordingTelemetry {
    /// Create a new recording client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<TelemetryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns only the recorded choices, in call order.
    pub fn choices(&self) -> Vec<ChoiceRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TelemetryCall::RecordChoice(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Waits (up to one second) until at least `count` calls were recorded.
    /// Fire-and-forget reports land on spawned tasks, so tests poll for them.
    pub async fn wait_for_calls(&self, count: usize) -> Vec<TelemetryCall> {
        for _ in 0..200 {
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.calls()
    }

    fn push(&self, call: TelemetryCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TelemetryClient for RecordingTelemetry {
    async fn start_session(&self, player_name: &str) -> Result<String, StoryError> {
        self.push(TelemetryCall::StartSession(player_name.to_owned()));
        Ok(TEST_SESSION_ID.to_owned())
    }

    async fn record_choice(&self, record: &ChoiceRecord) -> Result<(), StoryError> {
        self.push(TelemetryCall::RecordChoice(record.clone()));
        Ok(())
    }

    async fn complete_session(&self, session_id: &str, ending_id: &str) -> Result<(), StoryError> {
        self.push(TelemetryCall::CompleteSession(
            session_id.to_owned(),
            ending_id.to_owned(),
        ));
        Ok(())
    }

    async fn record_reward_download(
        &self,
        session_id: &str,
        reward_id: &str,
        reward_title: &str,
    ) -> Result<(), StoryError> {
        self.push(TelemetryCall::RewardDownload(
            session_id.to_owned(),
            reward_id.to_owned(),
            reward_title.to_owned(),
        ));
        Ok(())
    }

    async fn get_stats(&self, session_id: &str) -> Result<SessionStats, StoryError> {
        self.push(TelemetryCall::GetStats(session_id.to_owned()));
        Ok(SessionStats {
            total_sessions: 1,
            completed_sessions: 0,
        })
    }
}

/// A telemetry client whose every call fails like an unreachable backend.
#[derive(Debug)]
pub struct FailingTelemetry;

#[async_trait]
impl TelemetryClient for FailingTelemetry {
    async fn start_session(&self, _player_name: &str) -> Result<String, StoryError> {
        Err(StoryError::Telemetry("connection refused".into()))
    }

    async fn record_choice(&self, _record: &ChoiceRecord) -> Result<(), StoryError> {
        Err(StoryError::Telemetry("connection refused".into()))
    }

    async fn complete_session(
        &self,
        _session_id: &str,
        _ending_id: &str,
    ) -> Result<(), StoryError> {
        Err(StoryError::Telemetry("connection refused".into()))
    }

    async fn record_reward_download(
        &self,
        _session_id: &str,
        _reward_id: &str,
        _reward_title: &str,
    ) -> Result<(), StoryError> {
        Err(StoryError::Telemetry("connection refused".into()))
    }

    async fn get_stats(&self, _session_id: &str) -> Result<SessionStats, StoryError> {
        Err(StoryError::Telemetry("connection refused".into()))
    }
}

/// A telemetry client that starts sessions normally but never answers any
/// other call. Exercises the engine's telemetry timeout.
#[derive(Debug)]
pub struct HangingTelemetry;

#[async_trait]
impl TelemetryClient for HangingTelemetry {
    async fn start_session(&self, _player_name: &str) -> Result<String, StoryError> {
        Ok(TEST_SESSION_ID.to_owned())
    }

    async fn record_choice(&self, _record: &ChoiceRecord) -> Result<(), StoryError> {
        std::future::pending().await
    }

    async fn complete_session(
        &self,
        _session_id: &str,
        _ending_id: &str,
    ) -> Result<(), StoryError> {
        std::future::pending().await
    }

    async fn record_reward_download(
        &self,
        _session_id: &str,
        _reward_id: &str,
        _reward_title: &str,
    ) -> Result<(), StoryError> {
        std::future::pending().await
    }

    async fn get_stats(&self, _session_id: &str) -> Result<SessionStats, StoryError> {
        std::future::pending().await
    }
}

/// A telemetry client whose `record_choice` blocks until [`GatedTelemetry::open`]
/// is called. Lets tests hold a transition in flight.
#[derive(Debug)]
pub struct GatedTelemetry {
    gate_tx: watch::Sender<bool>,
    gate_rx: watch::Receiver<bool>,
    waiting: AtomicUsize,
    recorded: Mutex<Vec<ChoiceRecord>>,
}

impl Default for GatedTelemetry {
    fn default() -> Self {
        let (gate_tx, gate_rx) = watch::channel(false);
        Self {
            gate_tx,
            gate_rx,
            waiting: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }
}

impl GatedTelemetry {
    /// Create a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every blocked and future `record_choice` call.
    pub fn open(&self) {
        self.gate_tx.send_replace(true);
    }

    /// Waits until at least `count` calls are blocked on the gate.
    pub async fn wait_until_waiting(&self, count: usize) {
        while self.waiting.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    /// Returns the choices that made it through the gate.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded(&self) -> Vec<ChoiceRecord> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetryClient for GatedTelemetry {
    async fn start_session(&self, _player_name: &str) -> Result<String, StoryError> {
        Ok(TEST_SESSION_ID.to_owned())
    }

    async fn record_choice(&self, record: &ChoiceRecord) -> Result<(), StoryError> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate_rx.clone();
        gate.wait_for(|open| *open)
            .await
            .map_err(|e| StoryError::Telemetry(e.to_string()))?;
        self.recorded.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn complete_session(
        &self,
        _session_id: &str,
        _ending_id: &str,
    ) -> Result<(), StoryError> {
        Ok(())
    }

    async fn record_reward_download(
        &self,
        _session_id: &str,
        _reward_id: &str,
        _reward_title: &str,
    ) -> Result<(), StoryError> {
        Ok(())
    }

    async fn get_stats(&self, _session_id: &str) -> Result<SessionStats, StoryError> {
        Ok(SessionStats::default())
    }
}
