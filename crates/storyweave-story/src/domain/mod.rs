//! Story graph domain model.

pub mod document;
pub mod graph;
pub mod rewards;
pub mod validation;
