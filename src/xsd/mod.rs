//! In-memory XSD tree (XSD 1.0 subset)
//!
//! A record graph over the XSD element vocabulary. Ownership is tree-shaped:
//! the document owns its definitions and everything else refers to them by
//! qname, compared on the local part. The same tree is produced by the parser
//! for lifting and by the lowering pass for emission.

mod parser;

pub use parser::parse;

use crate::typemap::local_name;

/// A parsed or constructed schema document
#[derive(Debug, Clone, Default)]
pub struct XsdSchema {
    pub target_namespace: Option<String>,
    /// Global element declarations; the first one is the document root.
    pub elements: Vec<XsdElement>,
    pub groups: Vec<XsdGroup>,
    pub simple_types: Vec<XsdSimpleType>,
    pub complex_types: Vec<XsdComplexType>,
}

impl XsdSchema {
    /// Look up a named simple type by the qname's local part.
    pub fn find_simple_type(&self, qname: &str) -> Option<&XsdSimpleType> {
        let name = local_name(qname);
        self.simple_types
            .iter()
            .find(|st| st.name.as_deref() == Some(name))
    }

    /// Look up a named complex type by the qname's local part.
    pub fn find_complex_type(&self, qname: &str) -> Option<&XsdComplexType> {
        let name = local_name(qname);
        self.complex_types
            .iter()
            .find(|ct| ct.name.as_deref() == Some(name))
    }

    /// Look up a named group definition by the qname's local part.
    pub fn find_group(&self, qname: &str) -> Option<&XsdGroup> {
        let name = local_name(qname);
        self.groups.iter().find(|g| g.name == name)
    }
}

/// An element declaration, global or local
#[derive(Debug, Clone)]
pub struct XsdElement {
    pub name: String,
    /// Type reference by qname; `None` when the type is inline or absent.
    pub type_name: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub default: Option<String>,
    pub fixed: Option<String>,
    pub complex_type: Option<Box<XsdComplexType>>,
    pub simple_type: Option<Box<XsdSimpleType>>,
}

impl XsdElement {
    pub fn named(name: impl Into<String>) -> Self {
        XsdElement {
            name: name.into(),
            type_name: None,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            default: None,
            fixed: None,
            complex_type: None,
            simple_type: None,
        }
    }

    /// Required unless declared with `minOccurs="0"`.
    pub fn is_required(&self) -> bool {
        self.min_occurs != 0
    }
}

/// Upper occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

/// A complex type definition, named or inline
#[derive(Debug, Clone, Default)]
pub struct XsdComplexType {
    pub name: Option<String>,
    pub body: Option<ComplexBody>,
}

/// The single content model of a complex type
#[derive(Debug, Clone)]
pub enum ComplexBody {
    Compositor(Compositor),
    SimpleContent(Derivation),
    ComplexContent(Derivation),
}

/// `xs:sequence`, `xs:choice` or `xs:all` and its particles
#[derive(Debug, Clone)]
pub struct Compositor {
    pub kind: CompositorKind,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    /// Particles in document order.
    pub particles: Vec<Particle>,
}

impl Compositor {
    pub fn new(kind: CompositorKind) -> Self {
        Compositor {
            kind,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            particles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorKind {
    Sequence,
    Choice,
    All,
}

/// One entry of a compositor
#[derive(Debug, Clone)]
pub enum Particle {
    Element(XsdElement),
    GroupRef(GroupRef),
    Compositor(Compositor),
}

/// An in-place inclusion of a named group
#[derive(Debug, Clone)]
pub struct GroupRef {
    pub ref_name: String,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
}

/// A named, reusable compositor
#[derive(Debug, Clone)]
pub struct XsdGroup {
    pub name: String,
    pub body: Compositor,
}

/// `xs:extension` / `xs:restriction` under simple or complex content
#[derive(Debug, Clone)]
pub struct Derivation {
    pub kind: DerivationKind,
    pub base: String,
    pub compositor: Option<Compositor>,
    pub attributes: Vec<XsdAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationKind {
    Extension,
    Restriction,
}

/// An attribute declaration under a derivation
#[derive(Debug, Clone)]
pub struct XsdAttribute {
    pub name: String,
    pub type_name: Option<String>,
    pub required: bool,
    pub default: Option<String>,
    pub fixed: Option<String>,
}

/// A simple type definition, named or inline
#[derive(Debug, Clone, Default)]
pub struct XsdSimpleType {
    pub name: Option<String>,
    pub variety: Option<SimpleVariety>,
}

/// The three simple-type derivation varieties
#[derive(Debug, Clone)]
pub enum SimpleVariety {
    Restriction(SimpleRestriction),
    Union(XsdUnion),
    List(XsdList),
}

/// A facet-bearing restriction of a base simple type
#[derive(Debug, Clone, Default)]
pub struct SimpleRestriction {
    /// Base qname; empty when the attribute is missing.
    pub base: String,
    pub facets: Facets,
}

/// Constraining facets, kept as raw attribute values
///
/// Numeric facets are parsed at lift time so an invalid value can fail
/// citing the facet it came from.
#[derive(Debug, Clone, Default)]
pub struct Facets {
    pub patterns: Vec<String>,
    pub enumerations: Vec<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub min_inclusive: Option<String>,
    pub max_inclusive: Option<String>,
    pub min_exclusive: Option<String>,
    pub max_exclusive: Option<String>,
    pub total_digits: Option<String>,
    pub fraction_digits: Option<String>,
}

/// `xs:union` over named and inline member types
#[derive(Debug, Clone, Default)]
pub struct XsdUnion {
    pub member_types: Vec<String>,
    pub inline: Vec<XsdSimpleType>,
}

/// `xs:list` of a named or inline item type
#[derive(Debug, Clone, Default)]
pub struct XsdList {
    pub item_type: Option<String>,
    pub inline: Option<Box<XsdSimpleType>>,
}
