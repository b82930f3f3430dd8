//! Schema for persisted searches.

use serde_json::Value;
use std::path::{Component, Path};

use super::{string_members, validate_record, FieldSpec, Kind, Object};
use crate::error::SchemaViolation;
use crate::types::enums::{
    CraigslistRegion, CraigslistSubcategory, FacebookRadius, FacebookRegion, Source,
};
use crate::types::search::Search;

const SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("sid", Kind::String),
    FieldSpec::required("alias", Kind::String),
    FieldSpec::required("isEnabled", Kind::Boolean),
    FieldSpec::required("rank", Kind::Number),
    FieldSpec::required("sources", Kind::EnumArray(Source::VALUES)),
    FieldSpec::optional("minPrice", Kind::NonNegativeNumber),
    FieldSpec::optional("maxPrice", Kind::NonNegativeNumber),
    FieldSpec::declared_by("craigslistSearchDetails", Kind::Object, "craigslist")
        .with_validator(validate_craigslist_details),
    FieldSpec::declared_by("facebookSearchDetails", Kind::Object, "facebook")
        .with_validator(validate_facebook_details),
];

const CRAIGSLIST_DETAIL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("searchTerms", Kind::StringArray),
    FieldSpec::required("regions", Kind::EnumArray(CraigslistRegion::VALUES)),
    FieldSpec::required("subcategories", Kind::EnumArray(CraigslistSubcategory::VALUES)),
];

const FACEBOOK_DETAIL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("searchTerms", Kind::StringArray),
    FieldSpec::required("regionalDetails", Kind::ObjectArray(validate_regional_detail)),
];

const REGIONAL_DETAIL_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("region", Kind::Enum(FacebookRegion::VALUES)),
    FieldSpec::required("distance", Kind::Enum(FacebookRadius::VALUES)),
];

fn validate_craigslist_details(obj: &Object, prefix: &str) -> Vec<String> {
    validate_record(obj, CRAIGSLIST_DETAIL_FIELDS, prefix, &[])
}

fn validate_facebook_details(obj: &Object, prefix: &str) -> Vec<String> {
    validate_record(obj, FACEBOOK_DETAIL_FIELDS, prefix, &[])
}

fn validate_regional_detail(obj: &Object, prefix: &str) -> Vec<String> {
    validate_record(obj, REGIONAL_DETAIL_FIELDS, prefix, &[])
}

/// Validate a search record as stored under `key`.
///
/// When `key` is given it must equal the record's `sid`.
pub fn validate_search(value: &Value, key: Option<&str>) -> Result<(), SchemaViolation> {
    let prefix = record_prefix("search", value, "sid", key);

    let Some(record) = value.as_object() else {
        return Err(SchemaViolation::new(vec![format!(
            "{prefix}: record must be an object"
        )]));
    };

    let declared = string_members(record, "sources");
    let mut errors = validate_record(record, SEARCH_FIELDS, &prefix, &declared);

    if let (Some(min), Some(max)) = (
        record.get("minPrice").and_then(Value::as_f64),
        record.get("maxPrice").and_then(Value::as_f64),
    ) {
        if min > max {
            errors.push(format!(
                "{prefix}: minPrice ({min}) must not exceed maxPrice ({max})"
            ));
        }
    }

    if let Some(alias) = record.get("alias").and_then(Value::as_str) {
        if !alias.trim().is_empty() && !is_single_dir_name(alias) {
            errors.push(format!(
                "{prefix}: alias '{alias}' must be a single directory name"
            ));
        }
    }

    if let (Some(key), Some(sid)) = (key, record.get("sid").and_then(Value::as_str)) {
        if key != sid {
            errors.push(format!("{prefix}: key '{key}' does not match sid '{sid}'"));
        }
    }

    SchemaViolation::check(errors)
}

// The alias names the search's cache directory.
fn is_single_dir_name(alias: &str) -> bool {
    let mut components = Path::new(alias).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == alias
    ) && !alias.contains(['/', '\\'])
}

/// Validate and deserialize a search.
pub fn parse_search(value: &Value, key: Option<&str>) -> Result<Search, SchemaViolation> {
    validate_search(value, key)?;
    serde_json::from_value(value.clone()).map_err(|e| {
        let prefix = record_prefix("search", value, "sid", key);
        SchemaViolation::new(vec![format!("{prefix}: {e}")])
    })
}

/// `"{entity} {id}"`, using the record's id, then the map key, then `?`.
pub(crate) fn record_prefix(entity: &str, value: &Value, id_field: &str, key: Option<&str>) -> String {
    let id = value
        .get(id_field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or(key)
        .unwrap_or("?");
    format!("{entity} {id}")
}
