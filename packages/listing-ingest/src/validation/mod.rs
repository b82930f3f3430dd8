//! Declarative schema checking for persisted entities.
//!
//! Each entity describes its recognized properties with a table of
//! [`FieldSpec`]s. [`validate_record`] walks the table, checks every property
//! with [`check_prop`], reports unrecognized properties, and returns every
//! violation it found; it never stops at the first one.
//!
//! Nested object blocks carry their own validator and are only descended
//! into when their declaring source is listed on the record.

pub mod post;
pub mod search;

use serde_json::{Map, Value};

pub use post::{validate_post, validate_post_for_search};
pub use search::{parse_search, validate_search};

pub type Object = Map<String, Value>;

/// Validates a nested object. Receives the object and the error prefix to use.
pub type NestedValidator = fn(&Object, &str) -> Vec<String>;

/// Expected JSON shape of a property.
#[derive(Clone, Copy)]
pub enum Kind {
    String,
    Boolean,
    Number,
    NonNegativeNumber,
    Object,
    Enum(&'static [&'static str]),
    EnumArray(&'static [&'static str]),
    StringArray,
    ObjectArray(NestedValidator),
}

impl Kind {
    fn describe(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::NonNegativeNumber => "non-negative number",
            Kind::Object => "object",
            Kind::Enum(_) => "string",
            Kind::EnumArray(_) | Kind::StringArray | Kind::ObjectArray(_) => "array",
        }
    }
}

/// Whether a property must, may, or may only conditionally appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Required when the named source is declared on the record, forbidden otherwise.
    DeclaredBy(&'static str),
}

/// One row of an entity's field table.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: Kind,
    pub presence: Presence,
    pub validator: Option<NestedValidator>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
            validator: None,
        }
    }

    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
            validator: None,
        }
    }

    pub const fn declared_by(name: &'static str, kind: Kind, source: &'static str) -> Self {
        Self {
            name,
            kind,
            presence: Presence::DeclaredBy(source),
            validator: None,
        }
    }

    pub const fn with_validator(mut self, validator: NestedValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Per-call context for [`check_prop`].
#[derive(Default, Clone, Copy)]
pub struct CheckOptions<'a> {
    /// Sources declared on the record, for [`Presence::DeclaredBy`].
    pub declared_sources: &'a [&'a str],
    /// Applied to object values after the kind check passes.
    pub validator: Option<NestedValidator>,
}

/// Check a single property of `obj`.
pub fn check_prop(
    obj: &Object,
    name: &str,
    kind: Kind,
    presence: Presence,
    prefix: &str,
    options: &CheckOptions<'_>,
) -> Result<(), Vec<String>> {
    let value = obj.get(name).filter(|v| !v.is_null());

    let Some(value) = value else {
        let required = match presence {
            Presence::Required => true,
            Presence::Optional => false,
            Presence::DeclaredBy(source) => options.declared_sources.contains(&source),
        };
        return if required {
            Err(vec![format!("{prefix}: missing property '{name}'")])
        } else {
            Ok(())
        };
    };

    if let Presence::DeclaredBy(source) = presence {
        if !options.declared_sources.contains(&source) {
            return Err(vec![format!(
                "{prefix}: property '{name}' is not allowed when source '{source}' is not declared"
            )]);
        }
    }

    let mut errors = check_kind(value, kind, name, prefix);

    if errors.is_empty() {
        if let (Some(validator), Some(nested)) = (options.validator, value.as_object()) {
            errors.extend(validator(nested, &format!("{prefix}.{name}")));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_kind(value: &Value, kind: Kind, name: &str, prefix: &str) -> Vec<String> {
    let wrong_type = || vec![format!("{prefix}: property '{name}' must be a {}", kind.describe())];
    let no_value = || vec![format!("{prefix}: property '{name}' has no value")];

    match kind {
        Kind::String => match value.as_str() {
            Some(s) if s.trim().is_empty() => no_value(),
            Some(_) => vec![],
            None => wrong_type(),
        },
        Kind::Boolean => {
            if value.is_boolean() {
                vec![]
            } else {
                wrong_type()
            }
        }
        Kind::Number => {
            if value.is_number() {
                vec![]
            } else {
                wrong_type()
            }
        }
        Kind::NonNegativeNumber => match value.as_f64() {
            Some(n) if n >= 0.0 => vec![],
            _ => wrong_type(),
        },
        Kind::Object => {
            if value.is_object() {
                vec![]
            } else {
                wrong_type()
            }
        }
        Kind::Enum(allowed) => match value.as_str() {
            Some(s) if s.trim().is_empty() => no_value(),
            Some(s) => check_enum_members([s], allowed, name, prefix)
                .map(|e| vec![e])
                .unwrap_or_default(),
            None => wrong_type(),
        },
        Kind::EnumArray(allowed) => match value.as_array() {
            Some(items) if items.is_empty() => no_value(),
            Some(items) => {
                let rendered: Vec<String> = items.iter().map(render_member).collect();
                check_enum_members(rendered.iter().map(String::as_str), allowed, name, prefix)
                    .map(|e| vec![e])
                    .unwrap_or_default()
            }
            None => wrong_type(),
        },
        Kind::StringArray => match value.as_array() {
            Some(items) if items.is_empty() => no_value(),
            Some(items) => {
                let bad: Vec<String> = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.as_str().map_or(true, |s| s.trim().is_empty()))
                    .map(|(i, _)| i.to_string())
                    .collect();
                if bad.is_empty() {
                    vec![]
                } else {
                    vec![format!(
                        "{prefix}: property '{name}' has invalid element(s) at [{}]; expected non-empty strings",
                        bad.join(", ")
                    )]
                }
            }
            None => wrong_type(),
        },
        Kind::ObjectArray(validator) => match value.as_array() {
            Some(items) if items.is_empty() => no_value(),
            Some(items) => {
                let mut errors = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let element_prefix = format!("{prefix}.{name}[{i}]");
                    match item.as_object() {
                        Some(nested) => errors.extend(validator(nested, &element_prefix)),
                        None => errors.push(format!("{element_prefix}: element must be an object")),
                    }
                }
                errors
            }
            None => wrong_type(),
        },
    }
}

/// Report every member of `values` that is not in `allowed`, in one message.
pub fn check_enum_members<'v>(
    values: impl IntoIterator<Item = &'v str>,
    allowed: &[&str],
    name: &str,
    prefix: &str,
) -> Option<String> {
    let invalid: Vec<&str> = values
        .into_iter()
        .filter(|v| !allowed.contains(v))
        .collect();

    if invalid.is_empty() {
        return None;
    }

    Some(format!(
        "{prefix}: property '{name}' has invalid value(s) [{}]; expected one of [{}]",
        invalid.join(", "),
        allowed.join(", ")
    ))
}

fn render_member(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate `record` against `fields`, collecting every violation.
///
/// Properties not named in `fields` are reported as unexpected.
pub fn validate_record(
    record: &Object,
    fields: &[FieldSpec],
    prefix: &str,
    declared_sources: &[&str],
) -> Vec<String> {
    let mut errors = Vec::new();

    for field in fields {
        let options = CheckOptions {
            declared_sources,
            validator: field.validator,
        };
        if let Err(mut found) =
            check_prop(record, field.name, field.kind, field.presence, prefix, &options)
        {
            errors.append(&mut found);
        }
    }

    for key in record.keys() {
        if !fields.iter().any(|f| f.name == key) {
            errors.push(format!("{prefix}: unexpected property '{key}'"));
        }
    }

    errors
}

/// String members of an array property, ignoring anything else.
pub fn string_members<'a>(record: &'a Object, name: &str) -> Vec<&'a str> {
    record
        .get(name)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
