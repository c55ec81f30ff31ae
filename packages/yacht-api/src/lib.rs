//! Yacht Data Extractor service.
//!
//! HTTP boundary and command-line entry point around
//! [`listing_ingest::Pipeline`].

pub mod config;
pub mod server;
pub mod telemetry;

pub use config::Config;
