//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the ingestion library
//! without making network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::browser::{BrowserClient, FetchedPage};
use crate::types::enums::{CraigslistRegion, CraigslistSubcategory, Source};
use crate::types::post::{Post, PostExtras};
use crate::types::search::{CraigslistSearchDetails, Search};

pub use crate::stores::memory::MemoryDocumentStore;

/// A mock browser for testing.
///
/// Returns predefined pages without making network requests. Clones share
/// pages and the call log.
#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    /// Predefined pages by URL
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,

    /// URLs that should fail
    fail_urls: Arc<RwLock<Vec<String>>>,

    /// Requested URLs, in order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockBrowser {
    /// Create a new mock browser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let page = FetchedPage::new(url.clone(), html);
        self.with_fetched(page)
    }

    /// Serve a fully specified page.
    pub fn with_fetched(self, page: FetchedPage) -> Self {
        self.pages.write().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Mark a URL as failing.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Get all URLs requested from this mock.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl BrowserClient for MockBrowser {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "mock navigation failure".to_string(),
            });
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Navigation {
                url: url.to_string(),
                reason: "no mock page registered".to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Search `5`: craigslist, term `drill`, regions reno and modesto, tools.
pub fn craigslist_search() -> Search {
    Search::new("5", "shop-tools").with_craigslist(CraigslistSearchDetails::new(
        ["drill"],
        [CraigslistRegion::Reno, CraigslistRegion::Modesto],
        [CraigslistSubcategory::Tools],
    ))
}

/// A valid craigslist post for search `5` scoped to one coordinate.
pub fn craigslist_post(pid: &str, region: &str, search_term: &str, subcategory: &str) -> Post {
    Post {
        pid: pid.to_string(),
        sid: "5".to_string(),
        source: Source::Craigslist,
        regions: [region.to_string()].into(),
        search_terms: [search_term.to_string()].into(),
        title: "Cordless drill".to_string(),
        post_date: "2024-03-01".to_string(),
        price: 40.0,
        price_str: "$40".to_string(),
        hood: Some("Sparks".to_string()),
        thumbnail_url: "https://images.craigslist.org/drill.jpg".to_string(),
        url: Some(format!("https://reno.craigslist.org/tls/d/drill/{pid}.html")),
        extras: Some(PostExtras {
            subcategories: [subcategory.to_string()].into(),
        }),
    }
}

/// A craigslist gallery listing with a single image.
pub fn craigslist_listing_html(pid: &str, title: &str, price: &str) -> String {
    format!(
        r#"<li class="cl-search-result" data-pid="{pid}" title="{title}">
  <a class="main" href="https://reno.craigslist.org/tls/d/item/{pid}.html">
    <div class="cl-gallery"><img src="https://images.craigslist.org/{pid}.jpg"></div>
  </a>
  <a class="posting-title" href="https://reno.craigslist.org/tls/d/item/{pid}.html">
    <span class="label">{title}</span>
  </a>
  <div class="meta"><span title="posted">3/1</span>Sparks</div>
  <span class="priceinfo">{price}</span>
</li>"#
    )
}

/// A craigslist results page with a pagination banner.
pub fn craigslist_results_html(banner: &str, listings: &[String]) -> String {
    format!(
        r#"<html><body>
<div class="cl-search-paginator"><span class="cl-page-number">{banner}</span></div>
<ol class="cl-results">{}</ol>
</body></html>"#,
        listings.concat()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CraigslistParser, PageParser};

    #[tokio::test]
    async fn test_mock_browser_serves_and_records() {
        let browser = MockBrowser::new()
            .with_page("https://example.com/a", "<p>a</p>")
            .with_failure("https://example.com/down");

        let page = browser.fetch("https://example.com/a").await.unwrap();
        assert_eq!(page.html, "<p>a</p>");
        assert!(!page.has_next_page);

        assert!(browser.fetch("https://example.com/down").await.is_err());
        assert!(browser.fetch("https://example.com/missing").await.is_err());
        assert_eq!(browser.calls().len(), 3);
    }

    #[test]
    fn test_fixture_html_parses() {
        let html = craigslist_results_html(
            "1 - 2 of 2",
            &[
                craigslist_listing_html("1", "Drill", "$40"),
                craigslist_listing_html("2", "Saw", "$1,200"),
            ],
        );
        let parsed = CraigslistParser::new().parse(&html).unwrap();
        assert_eq!(parsed.listings.len(), 2);
        assert_eq!(parsed.listings[1].price, 1200.0);
        assert!(!parsed.has_next_page);
    }
}
