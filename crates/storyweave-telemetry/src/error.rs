//! Errors raised by the telemetry service.

use thiserror::Error;

/// Failures of telemetry commands and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No session with this id exists.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The session changed between load and save.
    #[error("session {session_id} was modified concurrently (expected version {expected}, found {actual})")]
    ConcurrencyConflict {
        /// The session being saved.
        session_id: String,
        /// The version the writer loaded.
        expected: u64,
        /// The version found in the store.
        actual: u64,
    },

    /// The request is well-formed but not acceptable.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
