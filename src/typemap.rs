//! Canonical correspondence between XSD built-in types and JSON Schema types
//!
//! Both converters go through this table: lifting maps XSD qnames to
//! `(type, format)` pairs, lowering maps JSON primitive types back to the
//! default XSD built-in for each.

/// JSON Schema primitive type keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl JsonKind {
    /// The `type` keyword spelling for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            JsonKind::String => "string",
            JsonKind::Integer => "integer",
            JsonKind::Number => "number",
            JsonKind::Boolean => "boolean",
            JsonKind::Null => "null",
        }
    }

    /// Parse a `type` keyword; anything outside the primitive set is `None`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(JsonKind::String),
            "integer" => Some(JsonKind::Integer),
            "number" => Some(JsonKind::Number),
            "boolean" => Some(JsonKind::Boolean),
            "null" => Some(JsonKind::Null),
            _ => None,
        }
    }
}

/// Strip any namespace prefix, leaving the local part of a qname.
///
/// Qnames are compared by local part only; `xs:string`, `xsd:string` and
/// `string` all name the same type.
pub fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

/// Map an XSD built-in type to its JSON Schema `(type, format)` pair.
///
/// Unlisted qnames fall back to a plain string, silently: an unknown named
/// type that reaches this table is semantically lossy but not an error.
pub fn json_type_for(qname: &str) -> (JsonKind, Option<&'static str>) {
    match local_name(qname) {
        "string" | "normalizedString" | "token" | "NMTOKEN" => (JsonKind::String, None),
        "date" => (JsonKind::String, Some("date")),
        "dateTime" => (JsonKind::String, Some("date-time")),
        "time" => (JsonKind::String, Some("time")),
        "duration" | "anyURI" => (JsonKind::String, Some("uri")),
        "base64Binary" => (JsonKind::String, Some("byte")),
        "boolean" => (JsonKind::Boolean, None),
        "decimal" | "double" | "float" => (JsonKind::Number, None),
        "integer" | "positiveInteger" | "negativeInteger" | "nonPositiveInteger"
        | "nonNegativeInteger" | "long" | "int" | "short" | "byte" | "unsignedLong"
        | "unsignedInt" | "unsignedShort" | "unsignedByte" => (JsonKind::Integer, None),
        _ => (JsonKind::String, None),
    }
}

/// The default XSD built-in emitted for each JSON primitive type.
///
/// `null` has no XSD counterpart; it lowers to an optional `xs:string`
/// (the `minOccurs="0"` half lives in the lowering pass).
pub fn xsd_type_for(kind: JsonKind) -> &'static str {
    match kind {
        JsonKind::String => "xs:string",
        JsonKind::Number => "xs:decimal",
        JsonKind::Integer => "xs:integer",
        JsonKind::Boolean => "xs:boolean",
        JsonKind::Null => "xs:string",
    }
}
