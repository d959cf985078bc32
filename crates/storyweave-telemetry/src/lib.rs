//! Storyweave — reading-session telemetry.
//!
//! Tracks reading sessions, the choices made in them, completions and
//! reward downloads. The server side (domain, store, handlers) backs the
//! companion HTTP service; [`client::HttpTelemetryClient`] is what the
//! navigation engine talks to.

pub mod application;
pub mod client;
pub mod domain;
pub mod error;
pub mod wire;
