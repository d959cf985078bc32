//! Storyweave — story navigation engine.
//!
//! Owns the reader's position in a story graph: entering at the start scene,
//! following choices to scenes and endings, restarting, returning home and
//! handing out rewards. Telemetry is reported along the way but never
//! allowed to affect navigation.

pub mod application;
pub mod domain;
