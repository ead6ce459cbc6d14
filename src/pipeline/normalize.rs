//! Lenient field normalization for model-produced JSON.
//!
//! Models return the same field as a string, a list, null, or (for older
//! prompt versions) a nested mapping. Every raw field is first classified
//! into a [`FieldShape`] and then handled by exhaustive matching.

use serde_json::{Map, Value};

/// Placeholder for empty text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// The closed set of input shapes a raw field can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape<'a> {
    /// Missing key or explicit `null`.
    Absent,
    /// String, number, or boolean.
    Scalar(&'a Value),
    /// JSON array.
    List(&'a [Value]),
    /// JSON object.
    Mapping(&'a Map<String, Value>),
}

impl<'a> FieldShape<'a> {
    /// Classify an optional raw value
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldShape::Absent,
            Some(Value::Array(items)) => FieldShape::List(items.as_slice()),
            Some(Value::Object(map)) => FieldShape::Mapping(map),
            Some(scalar) => FieldShape::Scalar(scalar),
        }
    }
}

/// Render any JSON value as trimmed text. Null renders empty; nested
/// collections render as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Text of an optional field, empty when absent.
pub fn field_text(value: Option<&Value>) -> String {
    value.map(value_text).unwrap_or_default()
}

/// Trimmed text, or `"N/A"` when empty.
pub fn text_or_na(value: Option<&Value>) -> String {
    let text = field_text(value);
    if text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        text
    }
}

/// Normalize a field into a list of trimmed, non-empty strings.
///
/// Lists keep their order with blank elements dropped; a scalar becomes a
/// one-element list when non-blank. A mapping is rendered as a single JSON
/// text element.
pub fn as_string_list(value: Option<&Value>) -> Vec<String> {
    match FieldShape::of(value) {
        FieldShape::Absent => Vec::new(),
        FieldShape::List(items) => items
            .iter()
            .map(value_text)
            .filter(|text| !text.is_empty())
            .collect(),
        FieldShape::Scalar(scalar) => non_empty(value_text(scalar)),
        FieldShape::Mapping(map) => {
            if map.is_empty() {
                Vec::new()
            } else {
                vec![Value::Object(map.clone()).to_string()]
            }
        }
    }
}

fn non_empty(text: String) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text]
    }
}

/// Core variables from a premise-extraction result.
///
/// A non-empty flat `core_variables` list wins. Otherwise the legacy
/// `variables` field is used: a mapping of category to list is flattened in
/// mapping order, any other shape goes through [`as_string_list`].
pub fn core_variables(core: Option<&Value>, legacy: Option<&Value>) -> Vec<String> {
    let flat = as_string_list(core);
    if !flat.is_empty() {
        return flat;
    }

    match FieldShape::of(legacy) {
        FieldShape::Mapping(categories) => categories
            .values()
            .flat_map(|raw| as_string_list(Some(raw)))
            .collect(),
        FieldShape::Absent | FieldShape::Scalar(_) | FieldShape::List(_) => {
            as_string_list(legacy)
        }
    }
}

/// Knowledge item texts from a retrieval result.
///
/// Entries may be plain strings or objects carrying an `item` field; entries
/// that normalize to empty are dropped.
pub fn knowledge_items(value: Option<&Value>) -> Vec<String> {
    match FieldShape::of(value) {
        FieldShape::List(entries) => entries
            .iter()
            .map(|entry| match entry {
                Value::Object(map) => field_text(map.get("item")),
                other => value_text(other),
            })
            .filter(|text| !text.is_empty())
            .collect(),
        FieldShape::Absent | FieldShape::Scalar(_) | FieldShape::Mapping(_) => {
            as_string_list(value)
        }
    }
}
