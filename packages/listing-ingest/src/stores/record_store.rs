//! Schema-checked searches and posts over a document store.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{SchemaViolation, StoreResult};
use crate::traits::document_store::DocumentStore;
use crate::types::post::Post;
use crate::types::search::Search;
use crate::validation::{parse_search, validate_post, validate_post_for_search};

pub const SEARCHES_DOCUMENT: &str = "searches";
pub const POSTS_DOCUMENT: &str = "posts";

/// Whether an upsert created a post or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
}

/// Searches and posts loaded from a `DocumentStore`.
///
/// Every record held here passed validation. Each successful upsert writes
/// the whole `posts` document through before returning; a rejected upsert
/// writes nothing.
pub struct RecordStore<D: DocumentStore> {
    backend: D,
    searches: BTreeMap<String, Search>,
    posts: BTreeMap<String, Post>,
}

impl<D: DocumentStore> RecordStore<D> {
    /// Load both documents, dropping records that fail validation.
    ///
    /// Missing or malformed documents load as empty. Only backend read
    /// failures are returned as errors.
    pub fn open(backend: D) -> StoreResult<Self> {
        let mut searches = BTreeMap::new();
        for (key, value) in load_document(&backend, SEARCHES_DOCUMENT)? {
            match parse_search(&value, Some(&key)) {
                Ok(search) => {
                    searches.insert(key, search);
                }
                Err(violation) => {
                    warn!(key = %key, violations = %violation, "dropping invalid search");
                }
            }
        }

        let mut posts = BTreeMap::new();
        for (key, value) in load_document(&backend, POSTS_DOCUMENT)? {
            let parsed = validate_post(&value, Some(&key)).and_then(|()| {
                serde_json::from_value::<Post>(value)
                    .map_err(|e| SchemaViolation::new(vec![format!("post {key}: {e}")]))
            });
            match parsed {
                Ok(post) => {
                    posts.insert(key, post);
                }
                Err(violation) => {
                    warn!(key = %key, violations = %violation, "dropping invalid post");
                }
            }
        }

        info!(
            searches = searches.len(),
            posts = posts.len(),
            "record store opened"
        );
        Ok(Self {
            backend,
            searches,
            posts,
        })
    }

    pub fn searches(&self) -> impl Iterator<Item = &Search> {
        self.searches.values()
    }

    pub fn search(&self, sid: &str) -> Option<&Search> {
        self.searches.get(sid)
    }

    /// Enabled searches by ascending rank, ties broken by sid.
    pub fn enabled_searches(&self) -> Vec<&Search> {
        let mut enabled: Vec<&Search> = self.searches.values().filter(|s| s.is_enabled).collect();
        enabled.sort_by(|a, b| a.rank.total_cmp(&b.rank).then_with(|| a.sid.cmp(&b.sid)));
        enabled
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn post(&self, pid: &str) -> Option<&Post> {
        self.posts.get(pid)
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn backend(&self) -> &D {
        &self.backend
    }

    pub fn into_backend(self) -> D {
        self.backend
    }

    /// Validate `fragment` against `search`, then insert or merge it.
    ///
    /// Set fields are unioned and scalars are replaced. On a validation
    /// failure the store is untouched and no write happens. If the write
    /// itself fails the in-memory change is rolled back.
    pub fn upsert_post(&mut self, fragment: Post, search: &Search) -> StoreResult<UpsertOutcome> {
        let value = serde_json::to_value(&fragment)?;
        validate_post_for_search(&value, search)?;

        let pid = fragment.pid.clone();
        let previous = self.posts.get(&pid).cloned();

        let outcome = match self.posts.get_mut(&pid) {
            Some(existing) => {
                if existing.source != fragment.source {
                    return Err(SchemaViolation::new(vec![format!(
                        "post {pid}: source '{}' conflicts with stored source '{}'",
                        fragment.source, existing.source
                    )])
                    .into());
                }
                existing.merge_from(fragment);
                UpsertOutcome::Merged
            }
            None => {
                self.posts.insert(pid.clone(), fragment);
                UpsertOutcome::Inserted
            }
        };

        if let Err(e) = self.persist_posts() {
            match previous {
                Some(post) => self.posts.insert(pid, post),
                None => self.posts.remove(&pid),
            };
            return Err(e);
        }

        debug!(pid = %pid, outcome = ?outcome, "post upserted");
        Ok(outcome)
    }

    fn persist_posts(&mut self) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(&self.posts)?;
        self.backend.write(POSTS_DOCUMENT, &contents)
    }
}

/// Read a document as a map of records. Anything but a JSON object is empty.
fn load_document<D: DocumentStore>(backend: &D, key: &str) -> StoreResult<Map<String, Value>> {
    let Some(contents) = backend.read(key)? else {
        debug!(document = key, "document not found, starting empty");
        return Ok(Map::new());
    };
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(records)) => Ok(records),
        Ok(_) => {
            warn!(document = key, "document is not a JSON object, treating as empty");
            Ok(Map::new())
        }
        Err(e) => {
            warn!(document = key, error = %e, "malformed document, treating as empty");
            Ok(Map::new())
        }
    }
}
