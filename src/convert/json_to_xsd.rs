//! Lowering from a JSON Schema tree to an XSD document
//!
//! Objects become inline complex types over an `xs:sequence`, arrays become
//! unbounded occurrences of the same-named element, `oneOf`/`anyOf` become an
//! `xs:choice` of synthesised wrapper elements and `allOf` flattens into a
//! single sequence. Constraint keywords (`pattern`, `enum`, length and range
//! bounds) have no XSD rendering here; dropping them is documented lossiness,
//! not an error.

use crate::error::{Result, TranscodeError};
use crate::json_schema::{ArraySchema, JsonSchema, ObjectSchema, PrimitiveSchema};
use crate::typemap::{xsd_type_for, JsonKind};
use crate::xsd::{
    ComplexBody, Compositor, CompositorKind, MaxOccurs, Particle, XsdComplexType, XsdElement,
    XsdSchema,
};

/// Lower a parsed JSON Schema to an XSD document.
///
/// `root_element` names the single global element; the root schema must be an
/// object. An empty `target_namespace` is treated as absent.
pub fn lower(
    schema: &JsonSchema,
    root_element: &str,
    target_namespace: Option<&str>,
) -> Result<XsdSchema> {
    if !matches!(schema, JsonSchema::Object(_)) {
        return Err(TranscodeError::XsdConversion(
            "root of JSON schema must be of type 'object'".to_string(),
        ));
    }

    let root = lower_element(root_element, schema, false)?;
    Ok(XsdSchema {
        target_namespace: target_namespace
            .filter(|ns| !ns.is_empty())
            .map(str::to_string),
        elements: vec![root],
        ..XsdSchema::default()
    })
}

/// Lower one schema node into an element declaration.
///
/// `optional` is decided by the caller: the root is always mandatory, object
/// children are optional unless listed in `required`, choice wrappers are
/// mandatory within their choice.
fn lower_element(name: &str, schema: &JsonSchema, optional: bool) -> Result<XsdElement> {
    let mut element = XsdElement::named(name);
    if optional {
        element.min_occurs = 0;
    }

    match schema {
        JsonSchema::Object(object) => {
            element.complex_type = Some(Box::new(compositor_type(
                CompositorKind::Sequence,
                lower_properties(object)?,
            )));
        }
        JsonSchema::Array(array) => lower_array(name, array, &mut element)?,
        JsonSchema::Primitive(primitive) => lower_primitive(name, primitive, &mut element)?,
        JsonSchema::OneOf { alternatives } => {
            if alternatives.is_empty() {
                return Err(TranscodeError::XsdConversion(format!(
                    "oneOf for property '{}' must contain at least one alternative",
                    name
                )));
            }
            let wrappers = alternatives
                .iter()
                .enumerate()
                .map(|(index, alternative)| {
                    lower_element(&format!("{}_choice_{}", name, index + 1), alternative, false)
                })
                .collect::<Result<Vec<_>>>()?;
            element.complex_type = Some(Box::new(compositor_type(CompositorKind::Choice, wrappers)));
        }
        JsonSchema::AllOf { conjuncts } => {
            let mut children = Vec::new();
            for conjunct in conjuncts {
                let JsonSchema::Object(object) = conjunct else {
                    return Err(TranscodeError::XsdConversion(format!(
                        "allOf for property '{}' must contain only object schemas",
                        name
                    )));
                };
                children.extend(lower_properties(object)?);
            }
            element.complex_type = Some(Box::new(compositor_type(
                CompositorKind::Sequence,
                children,
            )));
        }
    }

    Ok(element)
}

fn lower_properties(object: &ObjectSchema) -> Result<Vec<XsdElement>> {
    object
        .properties
        .iter()
        .map(|(name, schema)| lower_element(name, schema, !object.is_required(name)))
        .collect()
}

fn lower_array(name: &str, array: &ArraySchema, element: &mut XsdElement) -> Result<()> {
    element.max_occurs = MaxOccurs::Unbounded;
    let Some(items) = &array.items else {
        return Err(TranscodeError::XsdConversion(format!(
            "array '{}' must have an 'items' definition",
            name
        )));
    };
    // The item reuses the parent's name and only contributes its type; the
    // element's own occurrence attributes stay as set above.
    let item = lower_element(name, items, false)?;
    element.type_name = item.type_name;
    element.complex_type = item.complex_type;
    Ok(())
}

fn lower_primitive(
    name: &str,
    primitive: &PrimitiveSchema,
    element: &mut XsdElement,
) -> Result<()> {
    let Some(kind) = primitive.kind() else {
        return Err(TranscodeError::XsdConversion(format!(
            "unsupported JSON schema type: {} for property {}",
            primitive.jtype.as_deref().unwrap_or_default(),
            name
        )));
    };
    element.type_name = Some(xsd_type_for(kind).to_string());
    // `null` has no element counterpart; the nearest rendering is an
    // optional string.
    if kind == JsonKind::Null {
        element.min_occurs = 0;
    }
    Ok(())
}

fn compositor_type(kind: CompositorKind, children: Vec<XsdElement>) -> XsdComplexType {
    let mut compositor = Compositor::new(kind);
    compositor.particles = children.into_iter().map(Particle::Element).collect();
    XsdComplexType {
        name: None,
        body: Some(ComplexBody::Compositor(compositor)),
    }
}
