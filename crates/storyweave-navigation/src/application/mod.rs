//! Navigation application layer: the engine and its telemetry shim.

pub mod engine;
pub(crate) mod telemetry;
