//! Best-effort telemetry reporting with bounded waits.
//!
//! Every call is wrapped in a timeout. Failures and timeouts are logged and
//! swallowed; nothing here can fail a navigation operation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use storyweave_core::error::StoryError;
use storyweave_core::telemetry::{ChoiceRecord, TelemetryClient};
use tokio::runtime::Handle;
use tracing::{Instrument, Span, debug, warn};

/// Runs `call` for at most `after`, mapping expiry to `TelemetryTimeout`.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    call: impl Future<Output = Result<T, StoryError>>,
) -> Result<T, StoryError> {
    tokio::time::timeout(after, call)
        .await
        .unwrap_or(Err(StoryError::TelemetryTimeout { operation, after }))
}

fn log_failure(operation: &'static str, error: &StoryError) {
    warn!(operation, kind = ?error.kind(), error = %error, "telemetry call failed");
}

/// Wraps an optional client; with no client every report is a no-op.
#[derive(Clone)]
pub(crate) struct TelemetryShim {
    client: Option<Arc<dyn TelemetryClient>>,
    timeout: Duration,
}

impl TelemetryShim {
    pub(crate) fn new(client: Option<Arc<dyn TelemetryClient>>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Starts a session, returning its id when the backend answered in time.
    pub(crate) async fn start_session(&self, player_name: &str) -> Option<String> {
        let client = self.client.as_ref()?;
        match bounded(
            "start_session",
            self.timeout,
            client.start_session(player_name),
        )
        .await
        {
            Ok(session_id) => {
                debug!(%session_id, "telemetry session started");
                Some(session_id)
            }
            Err(e) => {
                log_failure("start_session", &e);
                None
            }
        }
    }

    /// Reports a choice and waits for the answer, up to the timeout.
    pub(crate) async fn record_choice(&self, record: &ChoiceRecord) {
        let Some(client) = &self.client else {
            return;
        };
        if let Err(e) = bounded("record_choice", self.timeout, client.record_choice(record)).await
        {
            log_failure("record_choice", &e);
        }
    }

    /// Reports session completion on a background task.
    pub(crate) fn complete_session(&self, session_id: String, ending_id: String) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let timeout = self.timeout;
        spawn_report(async move {
            bounded(
                "complete_session",
                timeout,
                client.complete_session(&session_id, &ending_id),
            )
            .await
            .map_err(|e| ("complete_session", e))
        });
    }

    /// Reports a reward download on a background task.
    pub(crate) fn reward_downloaded(&self, session_id: String, reward_id: String, title: String) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let timeout = self.timeout;
        spawn_report(async move {
            bounded(
                "record_reward_download",
                timeout,
                client.record_reward_download(&session_id, &reward_id, &title),
            )
            .await
            .map_err(|e| ("record_reward_download", e))
        });
    }
}

fn spawn_report(
    report: impl Future<Output = Result<(), (&'static str, StoryError)>> + Send + 'static,
) {
    let Ok(runtime) = Handle::try_current() else {
        debug!("no async runtime; telemetry report dropped");
        return;
    };
    runtime.spawn(
        async move {
            if let Err((operation, e)) = report.await {
                log_failure(operation, &e);
            }
        }
        .instrument(Span::current()),
    );
}
