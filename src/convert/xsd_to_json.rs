//! Lifting from an XSD document to a JSON Schema object
//!
//! The document root is the first global element; its conversion is the
//! returned schema, decorated with `$schema`. Named types and groups resolve
//! against the whole document by local name, with a visited stack so a
//! cyclic definition fails instead of recursing forever.
//!
//! Compositors map by kind: a sequence becomes an object with ordered
//! properties, a choice becomes `oneOf` over closed single-property objects,
//! an `xs:all` becomes a closed object. Group references are flattened in
//! document order before a compositor is converted.

use serde_json::{Map, Value};

use super::{type_schema, typed_value};
use crate::error::{Result, TranscodeError};
use crate::typemap::local_name;
use crate::xsd::{
    ComplexBody, Compositor, CompositorKind, Derivation, DerivationKind, GroupRef, MaxOccurs,
    Particle, XsdComplexType, XsdElement, XsdSchema,
};

const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Lift an XSD document to a JSON Schema object.
pub fn lift(schema: &XsdSchema) -> Result<Map<String, Value>> {
    let Some(root) = schema.elements.first() else {
        return Err(TranscodeError::Conversion(
            "XSD does not contain any root elements".to_string(),
        ));
    };

    let mut lifter = Lifter::new(schema);
    let lifted = lifter.element(root)?;

    let mut decorated = Map::new();
    decorated.insert(
        "$schema".to_string(),
        Value::String(SCHEMA_DIALECT.to_string()),
    );
    decorated.extend(lifted);
    Ok(decorated)
}

/// One lifting pass over a single document
pub(crate) struct Lifter<'a> {
    pub(crate) schema: &'a XsdSchema,
    /// Named types currently being resolved, by local name.
    resolving: Vec<String>,
}

impl<'a> Lifter<'a> {
    fn new(schema: &'a XsdSchema) -> Self {
        Lifter {
            schema,
            resolving: Vec::new(),
        }
    }

    /// Run `convert` with `qname` marked as in-resolution.
    pub(crate) fn resolve_type<F>(&mut self, qname: &str, convert: F) -> Result<Map<String, Value>>
    where
        F: FnOnce(&mut Self) -> Result<Map<String, Value>>,
    {
        let name = local_name(qname).to_string();
        if self.resolving.contains(&name) {
            return Err(TranscodeError::Conversion(format!(
                "cycle through type {}",
                name
            )));
        }
        self.resolving.push(name);
        let result = convert(self);
        self.resolving.pop();
        result
    }

    /// Convert one element declaration to a schema fragment.
    pub(crate) fn element(&mut self, el: &XsdElement) -> Result<Map<String, Value>> {
        let schema = self.schema;

        // A named simple type converts as-is; the element's occurrence
        // attributes belong to the containing compositor.
        if let Some(type_name) = el.type_name.as_deref() {
            if let Some(simple) = schema.find_simple_type(type_name) {
                return self.resolve_type(type_name, |lifter| lifter.simple_type(simple));
            }
        }

        let mut prop = if let Some(type_name) = el.type_name.as_deref() {
            if let Some(complex) = schema.find_complex_type(type_name) {
                self.resolve_type(type_name, |lifter| lifter.complex_type(complex))?
            } else {
                type_schema(type_name)
            }
        } else if let Some(simple) = &el.simple_type {
            self.simple_type(simple)?
        } else if let Some(complex) = &el.complex_type {
            self.complex_type(complex)?
        } else {
            Map::new()
        };

        // An unbounded element becomes the array wrapper in place of the
        // scalar result.
        if el.max_occurs == MaxOccurs::Unbounded {
            let mut array = Map::new();
            array.insert("type".to_string(), Value::String("array".to_string()));
            array.insert("items".to_string(), Value::Object(prop));
            prop = array;
        }

        let resolved_type = prop.get("type").and_then(Value::as_str).map(str::to_string);
        if let Some(default) = el.default.as_deref() {
            if let Some(value) = typed_value(default, resolved_type.as_deref()) {
                prop.insert("default".to_string(), value);
            }
        } else if let Some(fixed) = el.fixed.as_deref() {
            if let Some(value) = typed_value(fixed, resolved_type.as_deref()) {
                prop.insert("const".to_string(), value.clone());
                prop.insert("default".to_string(), value);
            }
        }

        Ok(prop)
    }

    /// Convert a complex type to an object schema.
    pub(crate) fn complex_type(&mut self, complex: &XsdComplexType) -> Result<Map<String, Value>> {
        match &complex.body {
            Some(ComplexBody::ComplexContent(derivation)) => match derivation.kind {
                DerivationKind::Extension => self.complex_extension(derivation),
                DerivationKind::Restriction => match &derivation.compositor {
                    Some(compositor) => self.compositor(compositor),
                    None => Ok(empty_object()),
                },
            },
            Some(ComplexBody::SimpleContent(derivation)) => self.simple_content(derivation),
            Some(ComplexBody::Compositor(compositor)) => self.compositor(compositor),
            None => Ok(empty_object()),
        }
    }

    /// Extension over a named complex base: the base's keys first, then the
    /// added compositor's children merged into `properties`/`required`.
    fn complex_extension(&mut self, derivation: &Derivation) -> Result<Map<String, Value>> {
        let schema = self.schema;
        let Some(base) = schema.find_complex_type(&derivation.base) else {
            return Err(TranscodeError::Conversion(format!(
                "failed to resolve base type {}",
                derivation.base
            )));
        };
        let mut obj = self.resolve_type(&derivation.base, |lifter| lifter.complex_type(base))?;

        if let Some(compositor) = &derivation.compositor {
            let additions = self.flatten(compositor)?;
            let mut properties = match obj.remove("properties") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let mut required = match obj.remove("required") {
                Some(Value::Array(names)) => names,
                _ => Vec::new(),
            };
            for element in &additions {
                let prop = self.element(element)?;
                properties.insert(element.name.clone(), Value::Object(prop));
                if element.is_required() {
                    required.push(Value::String(element.name.clone()));
                }
            }
            if !properties.is_empty() {
                obj.insert("properties".to_string(), Value::Object(properties));
            }
            if !required.is_empty() {
                obj.insert("required".to_string(), Value::Array(required));
            }
        }

        Ok(obj)
    }

    /// Simple content becomes an object holding the text under `value`
    /// alongside any extension attributes.
    fn simple_content(&mut self, derivation: &Derivation) -> Result<Map<String, Value>> {
        let mut properties = Map::new();
        properties.insert(
            "value".to_string(),
            Value::Object(type_schema(&derivation.base)),
        );
        let mut required = vec![Value::String("value".to_string())];

        if derivation.kind == DerivationKind::Extension {
            for attribute in &derivation.attributes {
                let mut attr_schema = type_schema(attribute.type_name.as_deref().unwrap_or(""));
                let attr_type = attr_schema
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(default) = attribute.default.as_deref() {
                    if let Some(value) = typed_value(default, attr_type.as_deref()) {
                        attr_schema.insert("default".to_string(), value);
                    }
                } else if let Some(fixed) = attribute.fixed.as_deref() {
                    if let Some(value) = typed_value(fixed, attr_type.as_deref()) {
                        attr_schema.insert("const".to_string(), value.clone());
                        attr_schema.insert("default".to_string(), value);
                    }
                }
                properties.insert(attribute.name.clone(), Value::Object(attr_schema));
                if attribute.required {
                    required.push(Value::String(attribute.name.clone()));
                }
            }
        }

        let mut obj = empty_object();
        obj.insert("properties".to_string(), Value::Object(properties));
        obj.insert("required".to_string(), Value::Array(required));
        Ok(obj)
    }

    fn compositor(&mut self, compositor: &Compositor) -> Result<Map<String, Value>> {
        match compositor.kind {
            CompositorKind::Sequence => self.sequence_object(compositor),
            CompositorKind::Choice => self.choice(compositor),
            CompositorKind::All => self.all_object(compositor),
        }
    }

    /// A sequence becomes an object with ordered properties; children are
    /// required unless declared with `minOccurs="0"`.
    fn sequence_object(&mut self, compositor: &Compositor) -> Result<Map<String, Value>> {
        let elements = self.flatten(compositor)?;
        let mut obj = empty_object();
        self.insert_members(&mut obj, &elements)?;
        Ok(obj)
    }

    /// A choice becomes `oneOf` over closed single-property objects; an
    /// unbounded choice wraps the `oneOf` in an array schema.
    fn choice(&mut self, compositor: &Compositor) -> Result<Map<String, Value>> {
        let elements = self.flatten(compositor)?;
        if elements.is_empty() {
            return Err(TranscodeError::Conversion(
                "XSD choice must contain at least one element".to_string(),
            ));
        }

        let options = self.choice_options(&elements)?;
        if compositor.max_occurs == MaxOccurs::Unbounded {
            let mut array = Map::new();
            array.insert("type".to_string(), Value::String("array".to_string()));
            array.insert("items".to_string(), Value::Object(options));
            return Ok(array);
        }
        Ok(options)
    }

    fn choice_options(&mut self, elements: &[XsdElement]) -> Result<Map<String, Value>> {
        let mut one_of = Vec::with_capacity(elements.len());
        for element in elements {
            let prop = self.element(element)?;

            let mut properties = Map::new();
            properties.insert(element.name.clone(), Value::Object(prop));

            let mut option = empty_object();
            option.insert("properties".to_string(), Value::Object(properties));
            option.insert(
                "required".to_string(),
                Value::Array(vec![Value::String(element.name.clone())]),
            );
            option.insert("additionalProperties".to_string(), Value::Bool(false));
            one_of.push(Value::Object(option));
        }

        let mut obj = Map::new();
        obj.insert("oneOf".to_string(), Value::Array(one_of));
        Ok(obj)
    }

    /// An `xs:all` becomes a closed object; order carries no meaning, so only
    /// membership and requiredness survive.
    fn all_object(&mut self, compositor: &Compositor) -> Result<Map<String, Value>> {
        let elements = self.flatten(compositor)?;
        if elements.is_empty() {
            return Err(TranscodeError::Conversion(
                "XSD all must contain at least one element".to_string(),
            ));
        }
        let mut obj = empty_object();
        self.insert_members(&mut obj, &elements)?;
        obj.insert("additionalProperties".to_string(), Value::Bool(false));
        Ok(obj)
    }

    fn insert_members(
        &mut self,
        obj: &mut Map<String, Value>,
        elements: &[XsdElement],
    ) -> Result<()> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for element in elements {
            let prop = self.element(element)?;
            properties.insert(element.name.clone(), Value::Object(prop));
            if element.is_required() {
                required.push(Value::String(element.name.clone()));
            }
        }
        if !properties.is_empty() {
            obj.insert("properties".to_string(), Value::Object(properties));
        }
        if !required.is_empty() {
            obj.insert("required".to_string(), Value::Array(required));
        }
        Ok(())
    }

    /// Flatten a compositor's particles into plain elements, in document
    /// order: group references inline (or wrap) their definition, nested
    /// compositors become synthetic wrapper elements.
    fn flatten(&mut self, compositor: &Compositor) -> Result<Vec<XsdElement>> {
        let mut elements = Vec::new();
        for particle in &compositor.particles {
            match particle {
                Particle::Element(element) => elements.push(element.clone()),
                Particle::GroupRef(group_ref) => elements.extend(self.expand_group(group_ref)?),
                Particle::Compositor(nested) => {
                    if compositor.kind == CompositorKind::Sequence
                        && nested.kind == CompositorKind::Sequence
                    {
                        elements.extend(self.flatten(nested)?);
                    } else if let Some(name) = nested_wrapper_name(compositor.kind, nested.kind) {
                        elements.push(wrapper_element(
                            name.to_string(),
                            nested.clone(),
                            1,
                            MaxOccurs::Bounded(1),
                        ));
                    }
                }
            }
        }
        Ok(elements)
    }

    /// Resolve a group reference. A sequence group inlines its children; a
    /// choice or all group becomes a synthetic wrapper element carrying the
    /// reference's occurrence attributes.
    fn expand_group(&mut self, group_ref: &GroupRef) -> Result<Vec<XsdElement>> {
        let schema = self.schema;
        let Some(group) = schema.find_group(&group_ref.ref_name) else {
            return Err(TranscodeError::Conversion(format!(
                "group reference '{}' not found in schema",
                group_ref.ref_name
            )));
        };

        let mut seen = vec![group.name.clone()];
        self.ensure_acyclic(&group.body, &mut seen)?;

        match group.body.kind {
            CompositorKind::Sequence => self.flatten(&group.body),
            CompositorKind::Choice => Ok(vec![wrapper_element(
                format!("group_choice_{}", group.name),
                group.body.clone(),
                group_ref.min_occurs,
                group_ref.max_occurs,
            )]),
            CompositorKind::All => Ok(vec![wrapper_element(
                format!("group_all_{}", group.name),
                group.body.clone(),
                group_ref.min_occurs,
                group_ref.max_occurs,
            )]),
        }
    }

    /// Walk a group body's reference graph and fail on the first revisit.
    ///
    /// Choice and all groups defer conversion into a wrapper element, so the
    /// in-resolution stack cannot catch a self-referential group; this check
    /// runs up front instead.
    fn ensure_acyclic(&self, body: &Compositor, seen: &mut Vec<String>) -> Result<()> {
        for particle in &body.particles {
            match particle {
                Particle::GroupRef(group_ref) => {
                    let name = local_name(&group_ref.ref_name).to_string();
                    if seen.contains(&name) {
                        return Err(TranscodeError::Conversion(format!(
                            "cycle through group {}",
                            name
                        )));
                    }
                    if let Some(inner) = self.schema.find_group(&group_ref.ref_name) {
                        seen.push(name);
                        self.ensure_acyclic(&inner.body, seen)?;
                        seen.pop();
                    }
                }
                Particle::Compositor(nested) => self.ensure_acyclic(nested, seen)?,
                Particle::Element(_) => {}
            }
        }
        Ok(())
    }
}

fn empty_object() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String("object".to_string()));
    map
}

fn wrapper_element(
    name: String,
    body: Compositor,
    min_occurs: u32,
    max_occurs: MaxOccurs,
) -> XsdElement {
    let mut element = XsdElement::named(name);
    element.min_occurs = min_occurs;
    element.max_occurs = max_occurs;
    element.complex_type = Some(Box::new(XsdComplexType {
        name: None,
        body: Some(ComplexBody::Compositor(body)),
    }));
    element
}

fn nested_wrapper_name(parent: CompositorKind, nested: CompositorKind) -> Option<&'static str> {
    match (parent, nested) {
        (CompositorKind::Sequence, CompositorKind::Choice) => Some("sequence_choice"),
        (CompositorKind::Sequence, CompositorKind::All) => Some("sequence_all"),
        (CompositorKind::Choice, CompositorKind::Sequence) => Some("choice_sequence"),
        (CompositorKind::Choice, CompositorKind::Choice) => Some("choice_nested"),
        (CompositorKind::Choice, CompositorKind::All) => Some("choice_all"),
        // The parser never nests compositors under xs:all.
        _ => None,
    }
}
