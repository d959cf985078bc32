//! Navigation domain: state, input events and choice resolution.

pub mod input;
pub mod resolution;
pub mod state;
