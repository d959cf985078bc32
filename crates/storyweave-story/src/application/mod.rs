//! Loading story graphs from their sources.

pub mod loader;
pub mod sources;
