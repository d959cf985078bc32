//! Telemetry application layer: session storage and request handlers.

pub mod command_handlers;
pub mod query_handlers;
pub mod store;
