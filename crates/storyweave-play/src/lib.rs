//! Storyweave — terminal reader.
//!
//! Drives a navigation engine from lines typed on standard input and renders
//! each state snapshot as plain text.

pub mod cli;
pub mod command;
pub mod render;
