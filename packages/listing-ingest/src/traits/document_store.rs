//! Key-value persistence of whole JSON documents.

use crate::error::StoreResult;

/// Synchronous read/write of named documents.
///
/// The record store writes through on every successful mutation, so writes
/// are blocking and complete before the mutation returns.
pub trait DocumentStore: Send {
    /// Read a document. `Ok(None)` when it has never been written.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace a document's contents.
    fn write(&mut self, key: &str, contents: &str) -> StoreResult<()>;
}
