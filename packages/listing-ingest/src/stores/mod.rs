//! Storage for searches and posts.
//!
//! - `RecordStore` - validated records with merge-on-conflict upsert
//! - `JsonFileStore` - one JSON file per document
//! - `MemoryDocumentStore` - in-memory documents (always available)

pub mod json_file;
pub mod memory;
pub mod record_store;

pub use json_file::JsonFileStore;
pub use memory::MemoryDocumentStore;
pub use record_store::{RecordStore, UpsertOutcome, POSTS_DOCUMENT, SEARCHES_DOCUMENT};
