//! Facebook Marketplace results parser.
//!
//! Marketplace markup is rendered client-side and has no stable contract
//! yet, so this parser reports an empty final page. Jobs for the source
//! still run and their pages are still cached for later inspection.

use chrono::NaiveDateTime;
use tracing::debug;

use super::{PageParser, ParsedPage};
use crate::error::ParseResult;
use crate::types::enums::Source;

#[derive(Debug, Clone, Default)]
pub struct FacebookParser;

impl FacebookParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for FacebookParser {
    fn source(&self) -> Source {
        Source::Facebook
    }

    fn parse_at(&self, html: &str, _now: NaiveDateTime) -> ParseResult<ParsedPage> {
        debug!(bytes = html.len(), "facebook page not parsed");
        Ok(ParsedPage::default())
    }
}
