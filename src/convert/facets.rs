//! Simple-type lifting: restrictions, unions, lists and facet application
//!
//! A restriction starts from its base — recursively converted when named,
//! mapped through the type table when built-in — and layers the constraining
//! facets on top. Unions become `oneOf`, lists become arrays.

use serde_json::{Map, Value};

use super::xsd_to_json::Lifter;
use super::{numeric_value, type_schema};
use crate::error::{Result, TranscodeError};
use crate::xsd::{Facets, SimpleRestriction, SimpleVariety, XsdList, XsdSimpleType, XsdUnion};

impl Lifter<'_> {
    /// Convert a simple type definition to a schema fragment.
    pub(crate) fn simple_type(&mut self, simple: &XsdSimpleType) -> Result<Map<String, Value>> {
        match &simple.variety {
            Some(SimpleVariety::Restriction(restriction)) => self.restriction(restriction),
            Some(SimpleVariety::Union(union)) => self.union(union),
            Some(SimpleVariety::List(list)) => self.list(list),
            None => Ok(Map::new()),
        }
    }

    fn restriction(&mut self, restriction: &SimpleRestriction) -> Result<Map<String, Value>> {
        let mut prop = if restriction.base.is_empty() {
            Map::new()
        } else {
            self.base_schema(&restriction.base)?
        };
        apply_facets(&mut prop, &restriction.facets)?;
        Ok(prop)
    }

    /// Resolve a simple base: a named type converts recursively and its keys
    /// are merged; anything else maps through the type table.
    fn base_schema(&mut self, base: &str) -> Result<Map<String, Value>> {
        let schema = self.schema;
        if let Some(named) = schema.find_simple_type(base) {
            return self
                .resolve_type(base, |lifter| lifter.simple_type(named))
                .map_err(|err| match err {
                    TranscodeError::Conversion(message) => TranscodeError::Conversion(format!(
                        "failed to resolve base type {}: {}",
                        base, message
                    )),
                    other => other,
                });
        }
        Ok(type_schema(base))
    }

    fn union(&mut self, union: &XsdUnion) -> Result<Map<String, Value>> {
        let mut alternatives = Vec::new();
        for member in &union.member_types {
            alternatives.push(Value::Object(self.member_schema(member)?));
        }
        for inline in &union.inline {
            alternatives.push(Value::Object(self.simple_type(inline)?));
        }
        if alternatives.is_empty() {
            return Err(TranscodeError::Conversion(
                "union type must contain at least one member type".to_string(),
            ));
        }

        let mut obj = Map::new();
        obj.insert("oneOf".to_string(), Value::Array(alternatives));
        Ok(obj)
    }

    fn list(&mut self, list: &XsdList) -> Result<Map<String, Value>> {
        let items = if let Some(inline) = &list.inline {
            self.simple_type(inline)?
        } else if let Some(item_type) = &list.item_type {
            self.member_schema(item_type)?
        } else {
            return Err(TranscodeError::Conversion(
                "list type must specify an item type".to_string(),
            ));
        };

        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String("array".to_string()));
        obj.insert("items".to_string(), Value::Object(items));
        Ok(obj)
    }

    fn member_schema(&mut self, qname: &str) -> Result<Map<String, Value>> {
        let schema = self.schema;
        if let Some(named) = schema.find_simple_type(qname) {
            return self.resolve_type(qname, |lifter| lifter.simple_type(named));
        }
        Ok(type_schema(qname))
    }
}

/// Layer constraining facets onto an already-typed schema fragment.
fn apply_facets(prop: &mut Map<String, Value>, facets: &Facets) -> Result<()> {
    match facets.patterns.as_slice() {
        [] => {}
        [single] => {
            prop.insert("pattern".to_string(), Value::String(single.clone()));
        }
        many => {
            let grouped: Vec<String> = many.iter().map(|p| format!("({})", p)).collect();
            prop.insert("pattern".to_string(), Value::String(grouped.join("|")));
        }
    }

    if !facets.enumerations.is_empty() {
        let jtype = prop.get("type").and_then(Value::as_str).map(str::to_string);
        let values = facets
            .enumerations
            .iter()
            .map(|value| coerce_enum_value(value, jtype.as_deref()))
            .collect();
        prop.insert("enum".to_string(), Value::Array(values));
    }

    if let Some(value) = &facets.min_length {
        prop.insert("minLength".to_string(), int_facet(value, "minLength")?);
    }
    if let Some(value) = &facets.max_length {
        prop.insert("maxLength".to_string(), int_facet(value, "maxLength")?);
    }
    if let Some(value) = &facets.min_inclusive {
        prop.insert("minimum".to_string(), numeric_facet(value, "minInclusive")?);
    }
    if let Some(value) = &facets.max_inclusive {
        prop.insert("maximum".to_string(), numeric_facet(value, "maxInclusive")?);
    }
    if let Some(value) = &facets.min_exclusive {
        prop.insert(
            "exclusiveMinimum".to_string(),
            numeric_facet(value, "minExclusive")?,
        );
    }
    if let Some(value) = &facets.max_exclusive {
        prop.insert(
            "exclusiveMaximum".to_string(),
            numeric_facet(value, "maxExclusive")?,
        );
    }
    if let Some(value) = &facets.total_digits {
        prop.insert("x-totalDigits".to_string(), int_facet(value, "totalDigits")?);
    }
    if let Some(value) = &facets.fraction_digits {
        prop.insert(
            "x-fractionDigits".to_string(),
            int_facet(value, "fractionDigits")?,
        );
    }

    Ok(())
}

/// Coerce an enumeration literal to the restriction's JSON type, falling back
/// to the literal text when it does not parse.
fn coerce_enum_value(value: &str, jtype: Option<&str>) -> Value {
    match jtype {
        Some("integer") => value
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(value.to_string())),
        Some("number") => value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        Some("boolean") => match value {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(value.to_string()),
        },
        _ => Value::String(value.to_string()),
    }
}

fn int_facet(value: &str, facet: &str) -> Result<Value> {
    value
        .parse::<i64>()
        .map(|n| Value::Number(n.into()))
        .map_err(|_| TranscodeError::Conversion(format!("invalid {} value: {}", facet, value)))
}

fn numeric_facet(value: &str, facet: &str) -> Result<Value> {
    numeric_value(value)
        .ok_or_else(|| TranscodeError::Conversion(format!("invalid {} value: {}", facet, value)))
}
