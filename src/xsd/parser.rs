//! XSD reader
//!
//! Maps a well-formed XML document onto the XSD tree. The schema's own
//! namespace prefix is irrelevant — matching is by element local name — and
//! constructs outside the supported subset (`notation`, `unique`, `key`,
//! attribute groups, …) are skipped without complaint.

use roxmltree::{Document, Node};

use super::{
    ComplexBody, Compositor, CompositorKind, Derivation, DerivationKind, Facets, GroupRef,
    MaxOccurs, Particle, SimpleRestriction, SimpleVariety, XsdAttribute, XsdComplexType,
    XsdElement, XsdGroup, XsdList, XsdSchema, XsdSimpleType, XsdUnion,
};
use crate::error::{Result, TranscodeError};

/// Parse an XSD document from its textual form.
pub fn parse(text: &str) -> Result<XsdSchema> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().name() != "schema" {
        return Err(TranscodeError::XsdParse(format!(
            "expected root element 'schema', found '{}'",
            root.tag_name().name()
        )));
    }

    let mut schema = XsdSchema {
        target_namespace: root.attribute("targetNamespace").map(str::to_string),
        ..XsdSchema::default()
    };

    for child in element_children(root) {
        match child.tag_name().name() {
            "element" => schema.elements.push(parse_element(child)),
            "group" => {
                if let Some(group) = parse_group(child) {
                    schema.groups.push(group);
                }
            }
            "simpleType" => schema.simple_types.push(parse_simple_type(child)),
            "complexType" => schema.complex_types.push(parse_complex_type(child)),
            _ => {}
        }
    }

    Ok(schema)
}

fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn parse_element(node: Node) -> XsdElement {
    let (min_occurs, max_occurs) = parse_occurs(node);
    let mut element = XsdElement {
        name: node.attribute("name").unwrap_or_default().to_string(),
        type_name: node.attribute("type").map(str::to_string),
        min_occurs,
        max_occurs,
        default: node.attribute("default").map(str::to_string),
        fixed: node.attribute("fixed").map(str::to_string),
        complex_type: None,
        simple_type: None,
    };
    for child in element_children(node) {
        match child.tag_name().name() {
            "complexType" => element.complex_type = Some(Box::new(parse_complex_type(child))),
            "simpleType" => element.simple_type = Some(Box::new(parse_simple_type(child))),
            _ => {}
        }
    }
    element
}

fn parse_complex_type(node: Node) -> XsdComplexType {
    let mut complex = XsdComplexType {
        name: node.attribute("name").map(str::to_string),
        body: None,
    };
    for child in element_children(node) {
        let body = match child.tag_name().name() {
            "sequence" => Some(ComplexBody::Compositor(parse_compositor(
                child,
                CompositorKind::Sequence,
            ))),
            "choice" => Some(ComplexBody::Compositor(parse_compositor(
                child,
                CompositorKind::Choice,
            ))),
            "all" => Some(ComplexBody::Compositor(parse_compositor(
                child,
                CompositorKind::All,
            ))),
            "simpleContent" => parse_derivation(child).map(ComplexBody::SimpleContent),
            "complexContent" => parse_derivation(child).map(ComplexBody::ComplexContent),
            _ => None,
        };
        if body.is_some() {
            complex.body = body;
            break;
        }
    }
    complex
}

fn parse_compositor(node: Node, kind: CompositorKind) -> Compositor {
    let (min_occurs, max_occurs) = parse_occurs(node);
    let mut compositor = Compositor {
        kind,
        min_occurs,
        max_occurs,
        particles: Vec::new(),
    };
    for child in element_children(node) {
        match child.tag_name().name() {
            "element" => compositor
                .particles
                .push(Particle::Element(parse_element(child))),
            "group" => {
                if let Some(ref_name) = child.attribute("ref") {
                    let (min_occurs, max_occurs) = parse_occurs(child);
                    compositor.particles.push(Particle::GroupRef(GroupRef {
                        ref_name: ref_name.to_string(),
                        min_occurs,
                        max_occurs,
                    }));
                }
            }
            // XSD 1.0 forbids compositors inside xs:all, so nesting is only
            // read under sequence and choice.
            "sequence" if kind != CompositorKind::All => compositor.particles.push(
                Particle::Compositor(parse_compositor(child, CompositorKind::Sequence)),
            ),
            "choice" if kind != CompositorKind::All => compositor.particles.push(
                Particle::Compositor(parse_compositor(child, CompositorKind::Choice)),
            ),
            "all" if kind != CompositorKind::All => compositor
                .particles
                .push(Particle::Compositor(parse_compositor(child, CompositorKind::All))),
            _ => {}
        }
    }
    compositor
}

fn parse_group(node: Node) -> Option<XsdGroup> {
    let name = node.attribute("name")?;
    let body = element_children(node).find_map(|child| match child.tag_name().name() {
        "sequence" => Some(parse_compositor(child, CompositorKind::Sequence)),
        "choice" => Some(parse_compositor(child, CompositorKind::Choice)),
        "all" => Some(parse_compositor(child, CompositorKind::All)),
        _ => None,
    })?;
    Some(XsdGroup {
        name: name.to_string(),
        body,
    })
}

fn parse_derivation(node: Node) -> Option<Derivation> {
    for child in element_children(node) {
        let kind = match child.tag_name().name() {
            "extension" => DerivationKind::Extension,
            "restriction" => DerivationKind::Restriction,
            _ => continue,
        };
        let compositor = element_children(child).find_map(|c| match c.tag_name().name() {
            "sequence" => Some(parse_compositor(c, CompositorKind::Sequence)),
            "choice" => Some(parse_compositor(c, CompositorKind::Choice)),
            "all" => Some(parse_compositor(c, CompositorKind::All)),
            _ => None,
        });
        let attributes = element_children(child)
            .filter(|c| c.tag_name().name() == "attribute")
            .filter_map(parse_attribute)
            .collect();
        return Some(Derivation {
            kind,
            base: child.attribute("base").unwrap_or_default().to_string(),
            compositor,
            attributes,
        });
    }
    None
}

fn parse_attribute(node: Node) -> Option<XsdAttribute> {
    let name = node.attribute("name")?;
    Some(XsdAttribute {
        name: name.to_string(),
        type_name: node.attribute("type").map(str::to_string),
        required: node.attribute("use") == Some("required"),
        default: node.attribute("default").map(str::to_string),
        fixed: node.attribute("fixed").map(str::to_string),
    })
}

fn parse_simple_type(node: Node) -> XsdSimpleType {
    let mut simple = XsdSimpleType {
        name: node.attribute("name").map(str::to_string),
        variety: None,
    };
    for child in element_children(node) {
        simple.variety = match child.tag_name().name() {
            "restriction" => Some(SimpleVariety::Restriction(parse_restriction(child))),
            "union" => Some(SimpleVariety::Union(parse_union(child))),
            "list" => Some(SimpleVariety::List(parse_list(child))),
            _ => continue,
        };
        break;
    }
    simple
}

fn parse_restriction(node: Node) -> SimpleRestriction {
    let mut restriction = SimpleRestriction {
        base: node.attribute("base").unwrap_or_default().to_string(),
        facets: Facets::default(),
    };
    for child in element_children(node) {
        let value = child.attribute("value").unwrap_or_default().to_string();
        let facets = &mut restriction.facets;
        match child.tag_name().name() {
            "pattern" => facets.patterns.push(value),
            "enumeration" => facets.enumerations.push(value),
            "minLength" => facets.min_length = Some(value),
            "maxLength" => facets.max_length = Some(value),
            "minInclusive" => facets.min_inclusive = Some(value),
            "maxInclusive" => facets.max_inclusive = Some(value),
            "minExclusive" => facets.min_exclusive = Some(value),
            "maxExclusive" => facets.max_exclusive = Some(value),
            "totalDigits" => facets.total_digits = Some(value),
            "fractionDigits" => facets.fraction_digits = Some(value),
            _ => {}
        }
    }
    restriction
}

fn parse_union(node: Node) -> XsdUnion {
    XsdUnion {
        member_types: node
            .attribute("memberTypes")
            .map(|types| types.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        inline: element_children(node)
            .filter(|c| c.tag_name().name() == "simpleType")
            .map(parse_simple_type)
            .collect(),
    }
}

fn parse_list(node: Node) -> XsdList {
    XsdList {
        item_type: node.attribute("itemType").map(str::to_string),
        inline: element_children(node)
            .find(|c| c.tag_name().name() == "simpleType")
            .map(|c| Box::new(parse_simple_type(c))),
    }
}

fn parse_occurs(node: Node) -> (u32, MaxOccurs) {
    let min = node
        .attribute("minOccurs")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let max = match node.attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(value) => MaxOccurs::Bounded(value.parse().unwrap_or(1)),
        None => MaxOccurs::Bounded(1),
    };
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_xml() {
        let err = parse("<xs:schema><unclosed>").unwrap_err();
        assert_eq!(err.code(), "XSD_PARSE_ERROR");
    }

    #[test]
    fn test_rejects_non_schema_root() {
        let err = parse(r#"<root xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#).unwrap_err();
        assert_eq!(err.code(), "XSD_PARSE_ERROR");
    }

    #[test]
    fn test_accepts_any_schema_prefix() {
        let schema = parse(
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
                 <xsd:element name="person" type="xsd:string"/>
               </xsd:schema>"#,
        )
        .unwrap();
        assert_eq!(schema.elements.len(), 1);
        assert_eq!(schema.elements[0].name, "person");
        assert_eq!(schema.elements[0].type_name.as_deref(), Some("xsd:string"));
    }

    #[test]
    fn test_parses_occurs_and_inline_complex_type() {
        let schema = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="order">
                   <xs:complexType>
                     <xs:sequence>
                       <xs:element name="line" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
                     </xs:sequence>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        )
        .unwrap();
        let complex = schema.elements[0].complex_type.as_ref().unwrap();
        let Some(ComplexBody::Compositor(seq)) = &complex.body else {
            panic!("expected a sequence body");
        };
        assert_eq!(seq.kind, CompositorKind::Sequence);
        let Particle::Element(line) = &seq.particles[0] else {
            panic!("expected an element particle");
        };
        assert_eq!(line.min_occurs, 0);
        assert_eq!(line.max_occurs, MaxOccurs::Unbounded);
    }

    #[test]
    fn test_unsupported_constructs_are_skipped() {
        let schema = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:notation name="png" public="image/png"/>
                 <xs:attributeGroup name="ignored"/>
                 <xs:element name="doc" type="xs:string">
                   <xs:unique name="u"/>
                 </xs:element>
               </xs:schema>"#,
        )
        .unwrap();
        assert_eq!(schema.elements.len(), 1);
        assert!(schema.groups.is_empty());
    }

    #[test]
    fn test_parses_named_definitions_and_group_refs() {
        let schema = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:group name="nameGroup">
                   <xs:sequence>
                     <xs:element name="first" type="xs:string"/>
                   </xs:sequence>
                 </xs:group>
                 <xs:simpleType name="code">
                   <xs:restriction base="xs:string">
                     <xs:pattern value="[A-Z]+"/>
                     <xs:enumeration value="AB"/>
                     <xs:enumeration value="CD"/>
                   </xs:restriction>
                 </xs:simpleType>
                 <xs:complexType name="personType">
                   <xs:sequence>
                     <xs:group ref="nameGroup" minOccurs="0"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
        )
        .unwrap();
        assert!(schema.find_group("nameGroup").is_some());
        assert!(schema.find_simple_type("tns:code").is_some());
        let person = schema.find_complex_type("personType").unwrap();
        let Some(ComplexBody::Compositor(seq)) = &person.body else {
            panic!("expected a sequence body");
        };
        let Particle::GroupRef(group_ref) = &seq.particles[0] else {
            panic!("expected a group ref particle");
        };
        assert_eq!(group_ref.ref_name, "nameGroup");
        assert_eq!(group_ref.min_occurs, 0);
    }

    #[test]
    fn test_parses_union_and_list() {
        let schema = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:simpleType name="sizeOrName">
                   <xs:union memberTypes="xs:integer xs:string"/>
                 </xs:simpleType>
                 <xs:simpleType name="numbers">
                   <xs:list itemType="xs:integer"/>
                 </xs:simpleType>
               </xs:schema>"#,
        )
        .unwrap();
        let Some(SimpleVariety::Union(union)) = &schema.simple_types[0].variety else {
            panic!("expected a union");
        };
        assert_eq!(union.member_types, vec!["xs:integer", "xs:string"]);
        let Some(SimpleVariety::List(list)) = &schema.simple_types[1].variety else {
            panic!("expected a list");
        };
        assert_eq!(list.item_type.as_deref(), Some("xs:integer"));
    }
}
