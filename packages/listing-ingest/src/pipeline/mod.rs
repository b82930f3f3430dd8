//! Ingestion pipeline.
//!
//! Wires the pieces into one run:
//! - enabled searches by rank are expanded into jobs
//! - the scheduler paces each fetch
//! - fetched HTML is cached, then parsed
//! - listings become post fragments and are merged into the record store

pub mod cache;
pub mod ingest;

pub use cache::cache_page;
pub use ingest::{post_fragment, IngestHandler, Ingestion, RunSummary};
