//! Yacht Listing Ingestion
//!
//! Turns the URL of a yacht-listing page into a structured record:
//!
//! ```text
//! Location ──▶ Fetcher ──▶ Normalizer ──▶ SizeGate ──▶ ListingExtractor ──▶ StructuredListing
//!  (parse)    (retry)      (pure)        (40k chars)   (schema-checked)
//! ```
//!
//! Each stage returns a typed result. The [`Pipeline`] maps every stage
//! failure into one [`PipelineError`] taxonomy so callers never need to
//! know component internals.
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_ingest::{Pipeline, ReqwestTransport};
//! use listing_ingest::ai::OpenAIBackend;
//!
//! let transport = ReqwestTransport::new(std::time::Duration::from_secs(10))?;
//! let backend = OpenAIBackend::from_env()?;
//! let pipeline = Pipeline::new(transport, backend);
//!
//! match pipeline.run("https://www.example-yachts.com/listing/123").await {
//!     Ok(listing) => println!("{}", serde_json::to_string_pretty(&listing)?),
//!     Err(e) => eprintln!("{}: {}", e.kind().code(), e),
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for the network transport and the extraction backend
//! - [`types`] - Location, documents, and the listing record
//! - [`fetch`] - Fetcher with bounded retry, plus the reqwest transport
//! - [`normalize`] - HTML reduction to compact text
//! - [`gate`] - Size limit in front of the extraction call
//! - [`extract`] - Extraction contract and record validation
//! - [`pipeline`] - Orchestrator
//! - [`testing`] - Test doubles for the transport and the backend

pub mod error;
pub mod extract;
pub mod fetch;
pub mod gate;
pub mod normalize;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

pub use error::{
    BackendError, ErrorKind, ExtractionError, FailureDescriptor, FetchError, InvalidLocation,
    PipelineError, SizeExceeded, TransportError,
};
pub use extract::{ListingExtractor, SYSTEM_INSTRUCTION};
pub use fetch::{Fetcher, ReqwestTransport, RetryPolicy};
pub use gate::{SizeGate, MAX_NORMALIZED_CHARS};
pub use normalize::{normalize, normalize_html};
pub use pipeline::{ListingPipeline, Pipeline, PipelineConfig, PipelineOutcome, Stage};
pub use traits::{
    backend::{ExtractionBackend, ExtractionRequest},
    transport::{Transport, TransportResponse},
};
pub use types::{
    document::{NormalizedText, RawDocument},
    listing::StructuredListing,
    location::Location,
};
