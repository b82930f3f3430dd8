//! In-memory document storage for testing and development.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::document_store::DocumentStore;

/// In-memory documents with a write counter.
///
/// Clones share the same documents, so a test can hand one clone to a
/// `RecordStore` and inspect the other. Not suitable for production as
/// data is lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write.
    pub fn with_document(self, key: impl Into<String>, contents: impl Into<String>) -> Self {
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), contents.into());
        self
    }

    /// Current contents of a document.
    pub fn document(&self, key: &str) -> Option<String> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.document(key))
    }

    fn write(&mut self, key: &str, contents: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::from(io::Error::new(
                io::ErrorKind::Other,
                format!("write to '{key}' refused"),
            )));
        }
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
