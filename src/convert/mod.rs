//! The two transformation directions
//!
//! Lowering walks a JSON Schema tree and constructs an XSD document; lifting
//! walks an XSD document, resolves its named types and groups, and constructs
//! a JSON Schema object. Both directions go through the shared type table in
//! [`crate::typemap`]. Each call owns its trees exclusively; nothing is
//! cached or shared between invocations.

mod facets;
mod json_to_xsd;
mod xsd_to_json;

pub use json_to_xsd::lower;
pub use xsd_to_json::lift;

use serde_json::{Map, Value};

use crate::typemap::json_type_for;

/// The `{type, format?}` schema for a built-in XSD type.
pub(crate) fn type_schema(qname: &str) -> Map<String, Value> {
    let (kind, format) = json_type_for(qname);
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    if let Some(format) = format {
        map.insert("format".to_string(), Value::String(format.to_string()));
    }
    map
}

/// Parse an attribute-supplied literal against the resolved JSON type.
///
/// Unparseable literals yield `None` and the caller drops the keyword rather
/// than failing the conversion.
pub(crate) fn typed_value(raw: &str, jtype: Option<&str>) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    match jtype {
        Some("boolean") => match raw {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Some("integer") => raw.parse::<i64>().ok().map(|n| Value::Number(n.into())),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => Some(Value::String(raw.to_string())),
    }
}

/// Parse a numeric facet value, integer first, then float.
pub(crate) fn numeric_value(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
