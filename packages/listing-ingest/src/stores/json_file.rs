//! One JSON file per document under a data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::document_store::DocumentStore;

/// Stores document `key` at `{data_dir}/{key}.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File backing document `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.path_for(key);
        let tmp = self.data_dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = contents.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.read("posts").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested"));

        store.write("posts", r#"{"1": {}}"#).unwrap();
        store.write("posts", r#"{"2": {}}"#).unwrap();

        assert_eq!(store.read("posts").unwrap().as_deref(), Some(r#"{"2": {}}"#));
        assert!(store.path_for("posts").ends_with("nested/posts.json"));
        assert!(!dir.path().join("nested/.posts.json.tmp").exists());
    }
}
