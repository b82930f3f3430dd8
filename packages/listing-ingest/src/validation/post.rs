//! Schema for persisted posts.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::search::record_prefix;
use super::{check_enum_members, string_members, validate_record, FieldSpec, Kind, Object};
use crate::error::SchemaViolation;
use crate::types::enums::{CraigslistSubcategory, Source};
use crate::types::search::Search;

lazy_static! {
    static ref PRICE_STR: Regex = Regex::new(r"^\$[\d,]+$").expect("valid price regex");
    static ref POST_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex");
}

const POST_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("pid", Kind::String),
    FieldSpec::required("sid", Kind::String),
    FieldSpec::required("source", Kind::Enum(Source::VALUES)),
    FieldSpec::required("regions", Kind::StringArray),
    FieldSpec::required("searchTerms", Kind::StringArray),
    FieldSpec::required("title", Kind::String),
    FieldSpec::required("postDate", Kind::String),
    FieldSpec::required("price", Kind::NonNegativeNumber),
    FieldSpec::required("priceStr", Kind::String),
    FieldSpec::optional("hood", Kind::String),
    FieldSpec::required("thumbnailUrl", Kind::String),
    FieldSpec::optional("url", Kind::String),
    FieldSpec::declared_by("extras", Kind::Object, "craigslist").with_validator(validate_extras),
];

const CRAIGSLIST_EXTRAS_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "subcategories",
    Kind::EnumArray(CraigslistSubcategory::VALUES),
)];

fn validate_extras(obj: &Object, prefix: &str) -> Vec<String> {
    validate_record(obj, CRAIGSLIST_EXTRAS_FIELDS, prefix, &[])
}

/// Validate a post record as stored under `key`.
///
/// Region membership depends on the post's source, so it is checked after
/// the field table once `source` is known to be valid.
pub fn validate_post(value: &Value, key: Option<&str>) -> Result<(), SchemaViolation> {
    SchemaViolation::check(post_errors(value, key))
}

/// Validate a candidate post against the search it was discovered under.
pub fn validate_post_for_search(value: &Value, search: &Search) -> Result<(), SchemaViolation> {
    let mut errors = post_errors(value, None);
    let prefix = record_prefix("post", value, "pid", None);

    if let Some(sid) = value.get("sid").and_then(Value::as_str) {
        if sid != search.sid {
            errors.push(format!(
                "{prefix}: sid '{sid}' does not match search '{}'",
                search.sid
            ));
        }
    }

    if let Some(source) = value
        .get("source")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Source>().ok())
    {
        if !search.declares(source) {
            errors.push(format!(
                "{prefix}: source '{source}' is not declared by search '{}'",
                search.sid
            ));
        }
    }

    SchemaViolation::check(errors)
}

fn post_errors(value: &Value, key: Option<&str>) -> Vec<String> {
    let prefix = record_prefix("post", value, "pid", key);

    let Some(record) = value.as_object() else {
        return vec![format!("{prefix}: record must be an object")];
    };

    let source = record
        .get("source")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Source>().ok());
    let declared: Vec<&str> = source.iter().map(Source::as_str).collect();

    let mut errors = validate_record(record, POST_FIELDS, &prefix, &declared);

    if let Some(source) = source {
        let regions = string_members(record, "regions");
        if let Some(e) =
            check_enum_members(regions, source.region_values(), "regions", &prefix)
        {
            errors.push(e);
        }
    }

    if let Some(date) = record.get("postDate").and_then(Value::as_str) {
        let well_formed = POST_DATE.is_match(date)
            && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
        if !date.trim().is_empty() && !well_formed {
            errors.push(format!(
                "{prefix}: property 'postDate' must be a YYYY-MM-DD date, got '{date}'"
            ));
        }
    }

    if let Some(price_str) = record.get("priceStr").and_then(Value::as_str) {
        if !price_str.trim().is_empty() && !PRICE_STR.is_match(price_str) {
            errors.push(format!(
                "{prefix}: property 'priceStr' must look like '$1,234', got '{price_str}'"
            ));
        }
    }

    if let (Some(key), Some(pid)) = (key, record.get("pid").and_then(Value::as_str)) {
        if key != pid {
            errors.push(format!("{prefix}: key '{key}' does not match pid '{pid}'"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::enums::{CraigslistRegion, CraigslistSubcategory as Sub};
    use crate::types::search::CraigslistSearchDetails;
    use serde_json::json;

    fn craigslist_post() -> Value {
        json!({
            "pid": "123",
            "sid": "5",
            "source": "craigslist",
            "regions": ["reno"],
            "searchTerms": ["drill"],
            "title": "Cordless drill",
            "postDate": "2024-03-01",
            "price": 40,
            "priceStr": "$40",
            "thumbnailUrl": "https://images.craigslist.org/a.jpg",
            "extras": {"subcategories": ["tools"]}
        })
    }

    fn search() -> Search {
        Search::new("5", "shop").with_craigslist(CraigslistSearchDetails::new(
            ["drill"],
            [CraigslistRegion::Reno],
            [Sub::Tools],
        ))
    }

    #[test]
    fn test_valid_post() {
        assert!(validate_post(&craigslist_post(), Some("123")).is_ok());
        assert!(validate_post_for_search(&craigslist_post(), &search()).is_ok());
    }

    #[test]
    fn test_extras_forbidden_for_facebook() {
        let mut value = craigslist_post();
        value["source"] = json!("facebook");

        let err = validate_post(&value, None).unwrap_err();
        // "reno" is a facebook region too, so extras is the only violation
        assert_eq!(
            err.errors,
            vec!["post 123: property 'extras' is not allowed when source 'craigslist' is not declared"]
        );
    }

    #[test]
    fn test_extras_required_for_craigslist() {
        let mut value = craigslist_post();
        value.as_object_mut().unwrap().remove("extras");

        let err = validate_post(&value, None).unwrap_err();
        assert_eq!(err.errors, vec!["post 123: missing property 'extras'"]);

        value["extras"] = json!({"subcategories": []});
        let err = validate_post(&value, None).unwrap_err();
        assert_eq!(
            err.errors,
            vec!["post 123.extras: property 'subcategories' has no value"]
        );
    }

    #[test]
    fn test_region_must_belong_to_source() {
        let mut value = craigslist_post();
        value["regions"] = json!(["reno", "la"]);
        let err = validate_post(&value, None).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.errors[0].starts_with("post 123: property 'regions' has invalid value(s) [la]"));
    }

    #[test]
    fn test_scalar_formats() {
        let mut value = craigslist_post();
        value["postDate"] = json!("03/01/2024");
        value["priceStr"] = json!("40 dollars");
        value["price"] = json!(-1);

        let err = validate_post(&value, None).unwrap_err();
        assert_eq!(err.len(), 3, "{:#?}", err.errors);
        assert!(err.errors.contains(
            &"post 123: property 'price' must be a non-negative number".to_string()
        ));
        assert!(err.errors.iter().any(|e| e.contains("'postDate' must be a YYYY-MM-DD")));
        assert!(err.errors.iter().any(|e| e.contains("'priceStr' must look like")));
    }

    #[test]
    fn test_impossible_calendar_date_rejected() {
        let mut value = craigslist_post();
        value["postDate"] = json!("2024-02-31");
        assert!(validate_post(&value, None).is_err());
    }

    #[test]
    fn test_search_context_checks() {
        let mut value = craigslist_post();
        value["sid"] = json!("6");
        let err = validate_post_for_search(&value, &search()).unwrap_err();
        assert_eq!(
            err.errors,
            vec!["post 123: sid '6' does not match search '5'"]
        );

        let facebook_only = Search::new("5", "shop").with_facebook(
            crate::types::search::FacebookSearchDetails::new(
                ["drill"],
                Vec::<crate::types::search::RegionalDetail>::new(),
            ),
        );
        let err = validate_post_for_search(&craigslist_post(), &facebook_only).unwrap_err();
        assert_eq!(
            err.errors,
            vec!["post 123: source 'craigslist' is not declared by search '5'"]
        );
    }

    #[test]
    fn test_key_must_match_pid() {
        let err = validate_post(&craigslist_post(), Some("999")).unwrap_err();
        assert_eq!(
            err.errors,
            vec!["post 123: key '999' does not match pid '123'"]
        );
    }
}
