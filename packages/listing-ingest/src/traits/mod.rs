//! Seams between the pipeline and the outside world.
//!
//! Both are injected at construction so tests can substitute doubles
//! (see [`crate::testing`]).

pub mod backend;
pub mod transport;
