//! Normalized listing records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::enums::Source;

/// A listing merged from one or more job results.
///
/// Set-valued fields are `BTreeSet`s so they are always stored sorted and
/// deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub pid: String,
    pub sid: String,
    pub source: Source,
    pub regions: BTreeSet<String>,
    pub search_terms: BTreeSet<String>,
    pub title: String,
    /// `YYYY-MM-DD`
    pub post_date: String,
    pub price: f64,
    pub price_str: String,
    /// Neighborhood. Listings without one omit the property instead of
    /// storing an empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hood: Option<String>,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<PostExtras>,
}

/// Source-specific fields. Only craigslist posts carry extras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostExtras {
    pub subcategories: BTreeSet<String>,
}

impl Post {
    /// Fold the set fields of `other` into `self` and take its scalars.
    ///
    /// Scalars are last-write-wins. `extras` subcategories are unioned; if
    /// only one side has extras, that side's extras survive.
    pub fn merge_from(&mut self, other: Post) {
        self.regions.extend(other.regions);
        self.search_terms.extend(other.search_terms);

        self.title = other.title;
        self.post_date = other.post_date;
        self.price = other.price;
        self.price_str = other.price_str;
        self.hood = other.hood;
        self.thumbnail_url = other.thumbnail_url;
        if other.url.is_some() {
            self.url = other.url;
        }

        if let Some(theirs) = other.extras {
            match self.extras.as_mut() {
                Some(mine) => mine.subcategories.extend(theirs.subcategories),
                None => self.extras = Some(theirs),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(region: &str, term: &str, title: &str) -> Post {
        Post {
            pid: "123".to_string(),
            sid: "5".to_string(),
            source: Source::Craigslist,
            regions: [region.to_string()].into(),
            search_terms: [term.to_string()].into(),
            title: title.to_string(),
            post_date: "2024-03-01".to_string(),
            price: 10.0,
            price_str: "$10".to_string(),
            hood: None,
            thumbnail_url: "https://images.example/1.jpg".to_string(),
            url: None,
            extras: Some(PostExtras {
                subcategories: ["tools".to_string()].into(),
            }),
        }
    }

    #[test]
    fn test_merge_unions_sets_and_overwrites_scalars() {
        let mut stored = post("reno", "saw", "old title");
        stored.merge_from(post("modesto", "drill", "new title"));

        assert_eq!(
            stored.regions.iter().collect::<Vec<_>>(),
            vec!["modesto", "reno"]
        );
        assert_eq!(
            stored.search_terms.iter().collect::<Vec<_>>(),
            vec!["drill", "saw"]
        );
        assert_eq!(stored.title, "new title");
    }

    #[test]
    fn test_serialized_sets_are_sorted_arrays() {
        let mut p = post("reno", "saw", "t");
        p.regions.insert("modesto".to_string());
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["regions"], serde_json::json!(["modesto", "reno"]));
        assert_eq!(value["extras"]["subcategories"], serde_json::json!(["tools"]));
        assert!(value.get("hood").is_none());
    }
}
