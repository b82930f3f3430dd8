//! Typed errors for the ingestion library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: schema violations are returned and the record is
//! rejected, fetch and page-shape failures are confined to one job.

use std::fmt;
use thiserror::Error;

/// Every violation found in one record, collected before returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaViolation {
    pub errors: Vec<String>,
}

impl SchemaViolation {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// `Ok(())` when `errors` is empty.
    pub fn check(errors: Vec<String>) -> std::result::Result<(), SchemaViolation> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(errors))
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema violation(s): {}", self.errors.len(), self.errors.join("; "))
    }
}

/// Errors from a `BrowserClient` fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The browser could not navigate to the page
    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors that abort parsing of one page.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Expected structural markers are absent
    #[error("page shape mismatch: {reason}")]
    PageShapeMismatch { reason: String },
}

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record failed schema validation; nothing was written
    #[error(transparent)]
    Validation(#[from] SchemaViolation),

    /// Backend write or read failed
    #[error("persistence error: {0}")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Record could not be serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Persist(Box::new(err))
    }
}

/// Errors for one ingestion job or run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Writing the HTML cache failed
    #[error("cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// The job references a search that is not loaded
    #[error("unknown search: {sid}")]
    UnknownSearch { sid: String },
}

/// Errors loading [`IngestConfig`](crate::IngestConfig) from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("{key} must be a valid value, got '{value}': {source}")]
    InvalidVar {
        key: String,
        value: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
