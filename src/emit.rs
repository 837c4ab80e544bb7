//! Serialisers for the two output dialects
//!
//! XML output is a small hand-rolled pretty printer over the XSD tree:
//! declaration line, `xs:` prefixes, two-space indentation, self-closing
//! empty elements. JSON output is `serde_json` pretty printing, which gives
//! the same two-space indentation.

use serde_json::{Map, Value};

use crate::error::{Result, TranscodeError};
use crate::xsd::{
    ComplexBody, Compositor, CompositorKind, Derivation, DerivationKind, MaxOccurs, Particle,
    SimpleVariety, XsdComplexType, XsdElement, XsdSchema, XsdSimpleType,
};

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Render a schema document as pretty-printed XML.
pub fn to_xml(schema: &XsdSchema) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<xs:schema elementFormDefault=\"qualified\"");
    if let Some(ns) = schema.target_namespace.as_deref().filter(|ns| !ns.is_empty()) {
        push_attr(&mut out, "targetNamespace", ns);
    }
    push_attr(&mut out, "xmlns:xs", XSD_NAMESPACE);
    out.push_str(">\n");

    for element in &schema.elements {
        write_element(&mut out, element, 1);
    }
    for simple in &schema.simple_types {
        write_simple_type(&mut out, simple, 1);
    }
    for complex in &schema.complex_types {
        write_complex_type(&mut out, complex, 1);
    }
    for group in &schema.groups {
        indent(&mut out, 1);
        out.push_str(&format!("<xs:group name=\"{}\">\n", escape(&group.name)));
        write_compositor(&mut out, &group.body, 2);
        indent(&mut out, 1);
        out.push_str("</xs:group>\n");
    }

    out.push_str("</xs:schema>\n");
    out
}

/// Render a JSON Schema object as pretty-printed JSON.
pub fn to_json(schema: &Map<String, Value>) -> Result<String> {
    serde_json::to_string_pretty(&Value::Object(schema.clone()))
        .map_err(TranscodeError::JsonMarshal)
}

fn write_element(out: &mut String, element: &XsdElement, depth: usize) {
    indent(out, depth);
    out.push_str(&format!("<xs:element name=\"{}\"", escape(&element.name)));
    if let Some(type_name) = &element.type_name {
        push_attr(out, "type", type_name);
    }
    if let Some(default) = &element.default {
        push_attr(out, "default", default);
    }
    if let Some(fixed) = &element.fixed {
        push_attr(out, "fixed", fixed);
    }
    push_occurs(out, element.min_occurs, element.max_occurs);

    let has_body = element.complex_type.is_some() || element.simple_type.is_some();
    if !has_body {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    if let Some(complex) = &element.complex_type {
        write_complex_type(out, complex, depth + 1);
    }
    if let Some(simple) = &element.simple_type {
        write_simple_type(out, simple, depth + 1);
    }
    indent(out, depth);
    out.push_str("</xs:element>\n");
}

fn write_complex_type(out: &mut String, complex: &XsdComplexType, depth: usize) {
    indent(out, depth);
    out.push_str("<xs:complexType");
    if let Some(name) = &complex.name {
        push_attr(out, "name", name);
    }
    let Some(body) = &complex.body else {
        out.push_str("/>\n");
        return;
    };
    out.push_str(">\n");
    match body {
        ComplexBody::Compositor(compositor) => write_compositor(out, compositor, depth + 1),
        ComplexBody::SimpleContent(derivation) => {
            write_content(out, "xs:simpleContent", derivation, depth + 1)
        }
        ComplexBody::ComplexContent(derivation) => {
            write_content(out, "xs:complexContent", derivation, depth + 1)
        }
    }
    indent(out, depth);
    out.push_str("</xs:complexType>\n");
}

fn write_compositor(out: &mut String, compositor: &Compositor, depth: usize) {
    let tag = match compositor.kind {
        CompositorKind::Sequence => "xs:sequence",
        CompositorKind::Choice => "xs:choice",
        CompositorKind::All => "xs:all",
    };
    indent(out, depth);
    out.push('<');
    out.push_str(tag);
    push_occurs(out, compositor.min_occurs, compositor.max_occurs);
    if compositor.particles.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for particle in &compositor.particles {
        match particle {
            Particle::Element(element) => write_element(out, element, depth + 1),
            Particle::GroupRef(group_ref) => {
                indent(out, depth + 1);
                out.push_str(&format!("<xs:group ref=\"{}\"", escape(&group_ref.ref_name)));
                push_occurs(out, group_ref.min_occurs, group_ref.max_occurs);
                out.push_str("/>\n");
            }
            Particle::Compositor(nested) => write_compositor(out, nested, depth + 1),
        }
    }
    indent(out, depth);
    out.push_str(&format!("</{}>\n", tag));
}

fn write_content(out: &mut String, tag: &str, derivation: &Derivation, depth: usize) {
    indent(out, depth);
    out.push_str(&format!("<{}>\n", tag));
    let inner = match derivation.kind {
        DerivationKind::Extension => "xs:extension",
        DerivationKind::Restriction => "xs:restriction",
    };
    indent(out, depth + 1);
    out.push_str(&format!("<{} base=\"{}\"", inner, escape(&derivation.base)));
    if derivation.compositor.is_none() && derivation.attributes.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push_str(">\n");
        if let Some(compositor) = &derivation.compositor {
            write_compositor(out, compositor, depth + 2);
        }
        for attribute in &derivation.attributes {
            indent(out, depth + 2);
            out.push_str(&format!("<xs:attribute name=\"{}\"", escape(&attribute.name)));
            if let Some(type_name) = &attribute.type_name {
                push_attr(out, "type", type_name);
            }
            if attribute.required {
                push_attr(out, "use", "required");
            }
            if let Some(default) = &attribute.default {
                push_attr(out, "default", default);
            }
            if let Some(fixed) = &attribute.fixed {
                push_attr(out, "fixed", fixed);
            }
            out.push_str("/>\n");
        }
        indent(out, depth + 1);
        out.push_str(&format!("</{}>\n", inner));
    }
    indent(out, depth);
    out.push_str(&format!("</{}>\n", tag));
}

fn write_simple_type(out: &mut String, simple: &XsdSimpleType, depth: usize) {
    indent(out, depth);
    out.push_str("<xs:simpleType");
    if let Some(name) = &simple.name {
        push_attr(out, "name", name);
    }
    let Some(variety) = &simple.variety else {
        out.push_str("/>\n");
        return;
    };
    out.push_str(">\n");
    match variety {
        SimpleVariety::Restriction(restriction) => {
            indent(out, depth + 1);
            out.push_str(&format!(
                "<xs:restriction base=\"{}\"",
                escape(&restriction.base)
            ));
            let facets = facet_lines(&restriction.facets);
            if facets.is_empty() {
                out.push_str("/>\n");
            } else {
                out.push_str(">\n");
                for (tag, value) in facets {
                    indent(out, depth + 2);
                    out.push_str(&format!("<{} value=\"{}\"/>\n", tag, escape(&value)));
                }
                indent(out, depth + 1);
                out.push_str("</xs:restriction>\n");
            }
        }
        SimpleVariety::Union(union) => {
            indent(out, depth + 1);
            out.push_str("<xs:union");
            if !union.member_types.is_empty() {
                push_attr(out, "memberTypes", &union.member_types.join(" "));
            }
            if union.inline.is_empty() {
                out.push_str("/>\n");
            } else {
                out.push_str(">\n");
                for inline in &union.inline {
                    write_simple_type(out, inline, depth + 2);
                }
                indent(out, depth + 1);
                out.push_str("</xs:union>\n");
            }
        }
        SimpleVariety::List(list) => {
            indent(out, depth + 1);
            out.push_str("<xs:list");
            if let Some(item_type) = &list.item_type {
                push_attr(out, "itemType", item_type);
            }
            if let Some(inline) = &list.inline {
                out.push_str(">\n");
                write_simple_type(out, inline, depth + 2);
                indent(out, depth + 1);
                out.push_str("</xs:list>\n");
            } else {
                out.push_str("/>\n");
            }
        }
    }
    indent(out, depth);
    out.push_str("</xs:simpleType>\n");
}

fn facet_lines(facets: &crate::xsd::Facets) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    for pattern in &facets.patterns {
        lines.push(("xs:pattern", pattern.clone()));
    }
    for value in &facets.enumerations {
        lines.push(("xs:enumeration", value.clone()));
    }
    let singles = [
        ("xs:minLength", &facets.min_length),
        ("xs:maxLength", &facets.max_length),
        ("xs:minInclusive", &facets.min_inclusive),
        ("xs:maxInclusive", &facets.max_inclusive),
        ("xs:minExclusive", &facets.min_exclusive),
        ("xs:maxExclusive", &facets.max_exclusive),
        ("xs:totalDigits", &facets.total_digits),
        ("xs:fractionDigits", &facets.fraction_digits),
    ];
    for (tag, value) in singles {
        if let Some(value) = value {
            lines.push((tag, value.clone()));
        }
    }
    lines
}

fn push_occurs(out: &mut String, min_occurs: u32, max_occurs: MaxOccurs) {
    if min_occurs != 1 {
        push_attr(out, "minOccurs", &min_occurs.to_string());
    }
    match max_occurs {
        MaxOccurs::Unbounded => push_attr(out, "maxOccurs", "unbounded"),
        MaxOccurs::Bounded(1) => {}
        MaxOccurs::Bounded(n) => push_attr(out, "maxOccurs", &n.to_string()),
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
