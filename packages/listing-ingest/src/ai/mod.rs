//! Reference extraction backends.
//!
//! Anything implementing [`ExtractionBackend`](crate::traits::backend::ExtractionBackend)
//! can stand in for these.

mod openai;

pub use openai::{OpenAIBackend, DEFAULT_MODEL};
