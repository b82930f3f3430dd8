//! Craigslist gallery-view results parser.
//!
//! The pagination banner (`601 - 700 of 719`) is the one structural marker
//! that must be present. Everything below the listing level degrades to a
//! logged fallback so one odd listing never costs the rest of the page.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{normalize_whitespace, PageParser, ParsedPage, RawListing};
use crate::error::{ParseError, ParseResult};
use crate::types::enums::Source;

/// Shown when a listing has no usable image.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://www.craigslist.org/images/peace.jpg";

lazy_static! {
    static ref BANNER: Regex =
        Regex::new(r"^([\d,]+)\s*-\s*([\d,]+)\s+of\s+([\d,]+)$").expect("valid banner regex");
    static ref RELATIVE_DATE: Regex =
        Regex::new(r"^(\d+)\s*(hrs|hr|h|mins|min|m)\s+ago$").expect("valid relative date regex");
    static ref ABSOLUTE_DATE: Regex =
        Regex::new(r"^(\d{1,2})/(\d{1,2})$").expect("valid absolute date regex");
    static ref PRICE_STR: Regex = Regex::new(r"^\$[\d,]+$").expect("valid price regex");
    static ref SELECTORS: Selectors = Selectors::new();
}

struct Selectors {
    banner: Selector,
    listing: Selector,
    main_link: Selector,
    title_link: Selector,
    gallery: Selector,
    swipe: Selector,
    swipe_img: Selector,
    empty_gallery: Selector,
    img: Selector,
    title: Selector,
    meta: Selector,
    date: Selector,
    price: Selector,
}

impl Selectors {
    fn new() -> Self {
        let sel = |css: &str| Selector::parse(css).expect("valid css selector");
        Self {
            banner: sel(".cl-page-number"),
            listing: sel("li.cl-search-result[data-pid]"),
            main_link: sel("a.main[href]"),
            title_link: sel("a.posting-title[href]"),
            gallery: sel(".cl-gallery"),
            swipe: sel(".swipe"),
            swipe_img: sel(".swipe-wrap img"),
            empty_gallery: sel(".empty-gallery"),
            img: sel("img"),
            title: sel("a.posting-title .label"),
            meta: sel(".meta"),
            date: sel("span[title]"),
            price: sel(".priceinfo"),
        }
    }
}

/// Parser for Craigslist search result pages.
#[derive(Debug, Clone)]
pub struct CraigslistParser {
    placeholder_thumbnail: String,
}

impl Default for CraigslistParser {
    fn default() -> Self {
        Self {
            placeholder_thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
        }
    }
}

impl CraigslistParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different image for listings without one.
    pub fn with_placeholder_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.placeholder_thumbnail = url.into();
        self
    }

    fn parse_listing(
        &self,
        node: ElementRef<'_>,
        index: usize,
        now: NaiveDateTime,
    ) -> Option<RawListing> {
        let pid = node.value().attr("data-pid").map(str::trim).unwrap_or("");
        if pid.is_empty() {
            warn!(index, "listing without pid, skipping");
            return None;
        }

        let url = first_attr(node, &SELECTORS.main_link, "href")
            .or_else(|| first_attr(node, &SELECTORS.title_link, "href"));
        let Some(url) = url else {
            warn!(pid, "listing without detail link, skipping");
            return None;
        };

        let title = node
            .select(&SELECTORS.title)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                node.value()
                    .attr("title")
                    .map(normalize_whitespace)
                    .filter(|t| !t.is_empty())
            });
        let title = title.unwrap_or_else(|| {
            warn!(pid, "listing without title");
            String::new()
        });

        let (price, price_str) = self.price(node, pid);
        let (post_date, hood) = self.meta(node, pid, now);

        Some(RawListing {
            pid: pid.to_string(),
            url,
            title,
            post_date,
            price,
            price_str,
            hood,
            thumbnail_url: self.thumbnail(node, pid),
        })
    }

    fn thumbnail(&self, node: ElementRef<'_>, pid: &str) -> String {
        let Some(gallery) = node.select(&SELECTORS.gallery).next() else {
            warn!(pid, "listing without gallery, using placeholder thumbnail");
            return self.placeholder_thumbnail.clone();
        };

        if gallery.value().classes().any(|c| c == "empty") {
            if gallery.select(&SELECTORS.empty_gallery).next().is_none() {
                warn!(pid, "empty gallery without empty-gallery marker");
            }
            return self.placeholder_thumbnail.clone();
        }

        let (image, kind) = if gallery.select(&SELECTORS.swipe).next().is_some() {
            (gallery.select(&SELECTORS.swipe_img).next(), "multi-image")
        } else {
            (gallery.select(&SELECTORS.img).next(), "single-image")
        };

        match image.and_then(image_src) {
            Some(src) => src,
            None => {
                warn!(pid, kind, "gallery without image, using placeholder thumbnail");
                self.placeholder_thumbnail.clone()
            }
        }
    }

    fn price(&self, node: ElementRef<'_>, pid: &str) -> (f64, String) {
        let Some(text) = node.select(&SELECTORS.price).next().map(text_of) else {
            debug!(pid, "listing without price, treating as free");
            return (0.0, format_price(0));
        };

        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        let amount = match digits.parse::<u64>() {
            Ok(amount) => amount,
            Err(_) => {
                warn!(pid, price = %text, "unreadable price, treating as free");
                0
            }
        };

        let price_str = if PRICE_STR.is_match(&text) {
            text
        } else {
            format_price(amount)
        };
        (amount as f64, price_str)
    }

    fn meta(
        &self,
        node: ElementRef<'_>,
        pid: &str,
        now: NaiveDateTime,
    ) -> (NaiveDate, Option<String>) {
        let today = now.date();
        let Some(meta) = node.select(&SELECTORS.meta).next() else {
            warn!(pid, "listing without meta block, using today's date");
            return (today, None);
        };

        let date_text = meta.select(&SELECTORS.date).next().map(text_of);
        let post_date = match date_text.as_deref().and_then(|t| parse_post_date(t, now)) {
            Some(date) => date,
            None => {
                warn!(pid, date = ?date_text, "unreadable post date, using today's date");
                today
            }
        };

        let direct_text: String = meta
            .children()
            .filter_map(|child| child.value().as_text().map(|t| (**t).to_owned()))
            .collect::<Vec<_>>()
            .join(" ");
        let hood = normalize_whitespace(&direct_text);
        let hood = hood.trim_matches(|c: char| c == '·' || c == '•' || c.is_whitespace());

        (post_date, (!hood.is_empty()).then(|| hood.to_string()))
    }
}

impl PageParser for CraigslistParser {
    fn source(&self) -> Source {
        Source::Craigslist
    }

    fn parse_at(&self, html: &str, now: NaiveDateTime) -> ParseResult<ParsedPage> {
        let document = Html::parse_document(html);

        let banner = document
            .select(&SELECTORS.banner)
            .next()
            .map(text_of)
            .ok_or_else(|| ParseError::PageShapeMismatch {
                reason: "pagination banner not found".to_string(),
            })?;
        let has_next_page =
            banner_has_next_page(&banner).ok_or_else(|| ParseError::PageShapeMismatch {
                reason: format!("unreadable pagination banner '{banner}'"),
            })?;

        let listings: Vec<RawListing> = document
            .select(&SELECTORS.listing)
            .enumerate()
            .filter_map(|(index, node)| self.parse_listing(node, index, now))
            .collect();

        debug!(
            listings = listings.len(),
            has_next_page, "parsed craigslist results page"
        );
        Ok(ParsedPage {
            listings,
            has_next_page,
        })
    }
}

/// Read a `from - to of total` banner. More pages exist while `to < total`.
pub fn banner_has_next_page(text: &str) -> Option<bool> {
    let text = normalize_whitespace(text);
    let captures = BANNER.captures(&text)?;
    let number = |i: usize| captures[i].replace(',', "").parse::<u64>().ok();
    let (_from, to, total) = (number(1)?, number(2)?, number(3)?);
    Some(to < total)
}

/// Read `3hr ago`, `45min ago` or `M/D` relative to `now`.
///
/// `M/D` dates are placed in the year of `now`.
pub fn parse_post_date(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let text = normalize_whitespace(text).to_lowercase();

    if let Some(captures) = RELATIVE_DATE.captures(&text) {
        let amount: i64 = captures[1].parse().ok()?;
        let elapsed = if captures[2].starts_with('h') {
            Duration::try_hours(amount)?
        } else {
            Duration::try_minutes(amount)?
        };
        return now.checked_sub_signed(elapsed).map(|t| t.date());
    }

    if let Some(captures) = ABSOLUTE_DATE.captures(&text) {
        let month: u32 = captures[1].parse().ok()?;
        let day: u32 = captures[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(now.year(), month, day);
    }

    None
}

/// `1200` becomes `$1,200`.
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn first_attr(node: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    node.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn image_src(img: ElementRef<'_>) -> Option<String> {
    let value = img.value();
    value
        .attr("src")
        .or_else(|| value.attr("data-src"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
