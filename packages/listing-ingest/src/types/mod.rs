//! Data types flowing through the pipeline.

pub mod document;
pub mod listing;
pub mod location;
