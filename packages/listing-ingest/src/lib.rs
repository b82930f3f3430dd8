//! Marketplace Listing Ingestion Library
//!
//! Expands saved searches into fetchable jobs, runs them through a paced,
//! pagination-aware queue, parses results pages into listings and merges
//! them into a schema-validated record store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_ingest::{Ingestion, IngestConfig, RecordStore};
//! use listing_ingest::testing::{MemoryDocumentStore, MockBrowser};
//!
//! let config = IngestConfig::default().without_pacing();
//! let store = RecordStore::open(MemoryDocumentStore::new())?;
//! let browser = MockBrowser::new().with_page(url, html);
//!
//! let mut ingestion = Ingestion::new(&config, browser, store);
//! let summary = ingestion.run().await;
//! println!("{} new posts", summary.new_posts());
//! ```
//!
//! # Modules
//!
//! - [`types`] - Searches, jobs, posts, closed enumerations and configuration
//! - [`validation`] - Declarative field checker and entity schemas
//! - [`jobs`] - Job generation and the single-flight scheduler
//! - [`parser`] - Results page parsers
//! - [`stores`] - Record store and document backends
//! - [`browsers`] - HTTP browser and rate limiting
//! - [`pipeline`] - End-to-end ingestion run
//! - [`testing`] - Mock implementations for testing

pub mod browsers;
pub mod error;
pub mod jobs;
pub mod parser;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, IngestError, ParseError, SchemaViolation, StoreError};
pub use traits::{
    browser::{BrowserClient, FetchedPage},
    document_store::DocumentStore,
};
pub use types::{
    config::{IngestConfig, Pacing},
    enums::{CraigslistRegion, CraigslistSubcategory, FacebookRadius, FacebookRegion, Source},
    job::{Job, JobDetails},
    post::{Post, PostExtras},
    search::{CraigslistSearchDetails, FacebookSearchDetails, RegionalDetail, Search},
};

// Re-export components
pub use browsers::{BrowserExt, HttpBrowser, RateLimitedBrowser};
pub use jobs::{JidCounter, JobGenerator, JobHandler, JobOutcome, Scheduler, SchedulerReport};
pub use parser::{CraigslistParser, FacebookParser, PageParser, ParsedPage, Parsers, RawListing};
pub use pipeline::{Ingestion, IngestHandler, RunSummary};
pub use stores::{JsonFileStore, MemoryDocumentStore, RecordStore, UpsertOutcome};
pub use validation::{parse_search, validate_post, validate_post_for_search, validate_search};

// Re-export testing utilities
pub use testing::MockBrowser;
