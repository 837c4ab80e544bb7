//! In-memory JSON Schema tree (draft 2020-12 subset) and its parser
//!
//! The tree keeps exactly what the lowering pass can express in XSD plus the
//! constraint keywords the data model carries along; unknown keywords are
//! ignored silently. Property insertion order is preserved — it is observable
//! in the emitted `xs:sequence`.

use serde_json::Value;

use crate::error::{Result, TranscodeError};
use crate::typemap::JsonKind;

/// A parsed JSON Schema node
#[derive(Debug, Clone)]
pub enum JsonSchema {
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
    /// `oneOf` or `anyOf` — both lower to an `xs:choice`.
    OneOf { alternatives: Vec<JsonSchema> },
    /// `allOf` — lowers to one flattened `xs:sequence`.
    AllOf { conjuncts: Vec<JsonSchema> },
}

/// An object schema with ordered properties
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    /// Properties in source declaration order.
    pub properties: Vec<(String, JsonSchema)>,
    pub required: Vec<String>,
    pub additional_properties: Option<bool>,
}

impl ObjectSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// An array schema
///
/// `items` stays optional here so the lowering pass can report the missing
/// definition against the owning property's name.
#[derive(Debug, Clone, Default)]
pub struct ArraySchema {
    pub items: Option<Box<JsonSchema>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// A scalar schema and its constraint keywords
#[derive(Debug, Clone, Default)]
pub struct PrimitiveSchema {
    /// The raw `type` keyword as written; `None` when absent.
    pub jtype: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub enum_values: Vec<Value>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub exclusive_minimum: Option<Value>,
    pub exclusive_maximum: Option<Value>,
    pub default: Option<Value>,
    pub const_value: Option<Value>,
    pub total_digits: Option<u64>,
    pub fraction_digits: Option<u64>,
}

impl PrimitiveSchema {
    /// The primitive kind, when `type` names one.
    pub fn kind(&self) -> Option<JsonKind> {
        self.jtype.as_deref().and_then(JsonKind::from_keyword)
    }
}

/// Parse a JSON Schema document from its textual form.
pub fn parse(text: &str) -> Result<JsonSchema> {
    let value: Value = serde_json::from_str(text).map_err(TranscodeError::SchemaParse)?;
    Ok(from_value(&value))
}

/// Build the tree from an already-parsed JSON value.
///
/// Classification order matters: compositional keywords win over `type`, an
/// explicit `properties` map implies an object even without `type`.
pub fn from_value(value: &Value) -> JsonSchema {
    let Some(map) = value.as_object() else {
        // Boolean schemas and other degenerate forms carry no constraints.
        return JsonSchema::Primitive(PrimitiveSchema::default());
    };

    if let Some(alternatives) = map.get("oneOf").or_else(|| map.get("anyOf")) {
        if let Some(list) = alternatives.as_array() {
            return JsonSchema::OneOf {
                alternatives: list.iter().map(from_value).collect(),
            };
        }
    }
    if let Some(Value::Array(list)) = map.get("allOf") {
        return JsonSchema::AllOf {
            conjuncts: list.iter().map(from_value).collect(),
        };
    }

    let jtype = map.get("type").and_then(Value::as_str);
    if jtype == Some("object") || (jtype.is_none() && map.contains_key("properties")) {
        return JsonSchema::Object(parse_object(map));
    }
    if jtype == Some("array") {
        return JsonSchema::Array(parse_array(map));
    }

    JsonSchema::Primitive(parse_primitive(map, jtype))
}

fn parse_object(map: &serde_json::Map<String, Value>) -> ObjectSchema {
    let properties = match map.get("properties").and_then(Value::as_object) {
        // serde_json runs with preserve_order, so iteration is source order.
        Some(props) => props.iter().map(|(k, v)| (k.clone(), from_value(v))).collect(),
        None => Vec::new(),
    };
    let required = match map.get("required").and_then(Value::as_array) {
        Some(names) => names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    ObjectSchema {
        properties,
        required,
        additional_properties: map.get("additionalProperties").and_then(Value::as_bool),
    }
}

fn parse_array(map: &serde_json::Map<String, Value>) -> ArraySchema {
    ArraySchema {
        items: map.get("items").map(|items| Box::new(from_value(items))),
        min_items: map.get("minItems").and_then(Value::as_u64),
        max_items: map.get("maxItems").and_then(Value::as_u64),
    }
}

fn parse_primitive(map: &serde_json::Map<String, Value>, jtype: Option<&str>) -> PrimitiveSchema {
    PrimitiveSchema {
        jtype: jtype.map(str::to_string),
        format: string_keyword(map, "format"),
        pattern: string_keyword(map, "pattern"),
        enum_values: map
            .get("enum")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        min_length: map.get("minLength").and_then(Value::as_u64),
        max_length: map.get("maxLength").and_then(Value::as_u64),
        minimum: map.get("minimum").cloned(),
        maximum: map.get("maximum").cloned(),
        exclusive_minimum: map.get("exclusiveMinimum").cloned(),
        exclusive_maximum: map.get("exclusiveMaximum").cloned(),
        default: map.get("default").cloned(),
        const_value: map.get("const").cloned(),
        total_digits: map.get("x-totalDigits").and_then(Value::as_u64),
        fraction_digits: map.get("x-fractionDigits").and_then(Value::as_u64),
    }
}

fn string_keyword(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
