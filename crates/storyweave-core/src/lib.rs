//! Storyweave Core — shared abstractions.
//!
//! This crate defines the error taxonomy and the traits at the seams of the
//! navigation engine: where story documents come from, where telemetry goes,
//! and what time it is. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod source;
pub mod telemetry;
