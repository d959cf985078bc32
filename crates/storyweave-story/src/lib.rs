//! Storyweave — story graph loading and validation.
//!
//! Responsible for fetching story documents, decoding and validating them,
//! and building the immutable, id-indexed story graph the navigation engine
//! walks.

pub mod application;
pub mod domain;
