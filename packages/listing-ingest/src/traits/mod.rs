//! Seams to the two external collaborators.
//!
//! - [`browser::BrowserClient`] renders a results page
//! - [`document_store::DocumentStore`] persists whole JSON documents

pub mod browser;
pub mod document_store;
