//! Shared test doubles and story fixtures for the Storyweave engine.

mod clock;
pub mod fixtures;
mod source;
mod telemetry;

pub use clock::FixedClock;
pub use source::{FailingStorySource, InMemoryStorySource};
pub use telemetry::{
    FailingTelemetry, GatedTelemetry, HangingTelemetry, RecordingTelemetry, TEST_SESSION_ID,
    TelemetryCall,
};
