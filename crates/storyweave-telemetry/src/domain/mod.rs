//! Telemetry domain: sessions and the commands that change them.

pub mod commands;
pub mod session;
