//! Browser trait for rendering search results pages.

use async_trait::async_trait;

use crate::error::FetchResult;

/// A rendered results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    /// The browser's own view of whether more results exist.
    ///
    /// Continuations are driven by the parser, which reads the page's
    /// pagination banner; this flag is informational.
    pub has_next_page: bool,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            has_next_page: false,
        }
    }

    pub fn with_next_page(mut self, has_next_page: bool) -> Self {
        self.has_next_page = has_next_page;
        self
    }
}

/// Renders a URL and returns its HTML.
///
/// Implementations must return an error on navigation failure rather than
/// an empty page.
#[async_trait]
pub trait BrowserClient: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    fn name(&self) -> &str {
        "browser"
    }
}
