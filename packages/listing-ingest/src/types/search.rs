//! Saved search definitions.

use serde::{Deserialize, Serialize};

use super::enums::{CraigslistRegion, CraigslistSubcategory, FacebookRadius, FacebookRegion, Source};

/// A saved query that drives job generation.
///
/// Searches are loaded from the persisted `searches` document and are only
/// read by the ingestion pipeline. A detail block is present iff its source
/// appears in `sources`; the schema validator enforces this before a
/// `Search` value is ever built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    pub sid: String,
    pub alias: String,
    pub is_enabled: bool,
    /// Ascending rank means higher priority.
    pub rank: f64,
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craigslist_search_details: Option<CraigslistSearchDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_search_details: Option<FacebookSearchDetails>,
}

impl Search {
    /// Create an enabled search with no sources.
    pub fn new(sid: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            alias: alias.into(),
            is_enabled: true,
            rank: 0.0,
            sources: Vec::new(),
            min_price: None,
            max_price: None,
            craigslist_search_details: None,
            facebook_search_details: None,
        }
    }

    /// Attach craigslist details and declare the craigslist source.
    pub fn with_craigslist(mut self, details: CraigslistSearchDetails) -> Self {
        if !self.sources.contains(&Source::Craigslist) {
            self.sources.push(Source::Craigslist);
        }
        self.craigslist_search_details = Some(details);
        self
    }

    /// Attach facebook details and declare the facebook source.
    pub fn with_facebook(mut self, details: FacebookSearchDetails) -> Self {
        if !self.sources.contains(&Source::Facebook) {
            self.sources.push(Source::Facebook);
        }
        self.facebook_search_details = Some(details);
        self
    }

    pub fn with_rank(mut self, rank: f64) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }

    pub fn declares(&self, source: Source) -> bool {
        self.sources.contains(&source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraigslistSearchDetails {
    pub search_terms: Vec<String>,
    pub regions: Vec<CraigslistRegion>,
    pub subcategories: Vec<CraigslistSubcategory>,
}

impl CraigslistSearchDetails {
    pub fn new(
        search_terms: impl IntoIterator<Item = impl Into<String>>,
        regions: impl IntoIterator<Item = CraigslistRegion>,
        subcategories: impl IntoIterator<Item = CraigslistSubcategory>,
    ) -> Self {
        Self {
            search_terms: search_terms.into_iter().map(Into::into).collect(),
            regions: regions.into_iter().collect(),
            subcategories: subcategories.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookSearchDetails {
    pub search_terms: Vec<String>,
    pub regional_details: Vec<RegionalDetail>,
}

impl FacebookSearchDetails {
    pub fn new(
        search_terms: impl IntoIterator<Item = impl Into<String>>,
        regional_details: impl IntoIterator<Item = RegionalDetail>,
    ) -> Self {
        Self {
            search_terms: search_terms.into_iter().map(Into::into).collect(),
            regional_details: regional_details.into_iter().collect(),
        }
    }
}

/// One facebook location and the radius searched around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalDetail {
    pub region: FacebookRegion,
    pub distance: FacebookRadius,
}
