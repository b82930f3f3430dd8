//! Page parsers that turn one results page into raw listings.
//!
//! A parser either returns the listings it could read plus whether more
//! pages exist, or fails the whole page with `PageShapeMismatch` when the
//! structural markers it relies on are missing. Problems confined to one
//! listing never fail the page.

pub mod craigslist;
pub mod facebook;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseResult;
use crate::types::enums::Source;

pub use craigslist::CraigslistParser;
pub use facebook::FacebookParser;

/// Listing fields as read from a results page, before they become a `Post`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub pid: String,
    pub url: String,
    pub title: String,
    pub post_date: NaiveDate,
    pub price: f64,
    pub price_str: String,
    pub hood: Option<String>,
    pub thumbnail_url: String,
}

/// Everything read from one results page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub listings: Vec<RawListing>,
    pub has_next_page: bool,
}

pub trait PageParser: Send + Sync {
    fn source(&self) -> Source;

    /// Parse with `now` as the reference for relative dates.
    fn parse_at(&self, html: &str, now: NaiveDateTime) -> ParseResult<ParsedPage>;

    fn parse(&self, html: &str) -> ParseResult<ParsedPage> {
        self.parse_at(html, Local::now().naive_local())
    }
}

/// One parser per source.
#[derive(Debug, Default, Clone)]
pub struct Parsers {
    pub craigslist: CraigslistParser,
    pub facebook: FacebookParser,
}

impl Parsers {
    pub fn for_source(&self, source: Source) -> &dyn PageParser {
        match source {
            Source::Craigslist => &self.craigslist,
            Source::Facebook => &self.facebook,
        }
    }
}

/// Collapse every whitespace run to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
