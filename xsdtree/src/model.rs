//! Compiled schema model.
//!
//! A [`Schema`] is an arena: element declarations and complex types are
//! stored once and referred to by index, so named types shared by several
//! elements (or types that contain themselves) never get duplicated.

use std::fmt;

/// Index of an [`Element`] inside a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Index of a [`ComplexType`] inside a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComplexTypeId(pub(crate) usize);

/// Upper occurrence bound of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u64),
    Unbounded,
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{n}"),
            MaxOccurs::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// `minOccurs`/`maxOccurs` pair of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u64,
    pub max: MaxOccurs,
}

impl Default for Occurs {
    fn default() -> Self {
        Self {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }
}

impl Occurs {
    /// Whether `minOccurs` differs from the schema default of 1.
    pub fn has_explicit_min(&self) -> bool {
        self.min != 1
    }

    /// Whether `maxOccurs` differs from the schema default of 1.
    pub fn has_explicit_max(&self) -> bool {
        self.max != MaxOccurs::Bounded(1)
    }
}

/// An element declaration.
#[derive(Debug, Clone)]
pub struct Element {
    /// Local name of the element.
    pub name: String,
    /// Local name of the referenced named type, `None` for anonymous types.
    pub type_name: Option<String>,
    /// Occurrence constraints taken from the declaration (or reference) site.
    pub occurs: Occurs,
    /// The element's compiled type.
    pub kind: ElementKind,
}

impl Element {
    /// Returns the complex type id when the element has complex content.
    pub fn complex_type(&self) -> Option<ComplexTypeId> {
        match self.kind {
            ElementKind::Complex(id) => Some(id),
            ElementKind::Simple(_) => None,
        }
    }

    /// Returns the simple type when the element has simple content.
    pub fn simple_type(&self) -> Option<&SimpleType> {
        match &self.kind {
            ElementKind::Simple(simple) => Some(simple),
            ElementKind::Complex(_) => None,
        }
    }
}

/// The type of an element: complex (nested content) or simple (text).
#[derive(Debug, Clone)]
pub enum ElementKind {
    Complex(ComplexTypeId),
    Simple(SimpleType),
}

/// Content classification of a complex type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// No content particle at all.
    Empty,
    /// `xs:simpleContent`.
    TextOnly,
    /// Child elements only.
    ElementOnly,
    /// `mixed="true"`.
    Mixed,
}

/// A complex type definition, named or anonymous.
#[derive(Debug, Clone)]
pub struct ComplexType {
    pub name: Option<String>,
    pub content: ContentType,
    pub particle: Option<Particle>,
}

/// The content model of a complex type.
#[derive(Debug, Clone)]
pub enum Particle {
    Sequence(Vec<SequenceItem>),
    Choice,
    All,
    /// Reference to a named model group.
    Group(String),
    /// `xs:complexContent` derivation (extension or restriction).
    ComplexContent,
}

impl Particle {
    /// Short XSD-style name of the compositor, for diagnostics.
    pub fn compositor(&self) -> &'static str {
        match self {
            Particle::Sequence(_) => "sequence",
            Particle::Choice => "choice",
            Particle::All => "all",
            Particle::Group(_) => "group",
            Particle::ComplexContent => "complexContent",
        }
    }
}

/// One item of an `xs:sequence`.
#[derive(Debug, Clone)]
pub enum SequenceItem {
    Element(ElementId),
    Any(Wildcard),
    /// A compositor nested inside the sequence.
    Nested(Particle),
}

/// An `xs:any` wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wildcard {
    /// `processContents`, absent when the schema leaves it at its default.
    pub process_contents: Option<String>,
    /// `namespace`, absent when the schema leaves it at `##any`.
    pub namespace: Option<String>,
    pub occurs: Occurs,
}

/// A simple type: a built-in, or a restriction with facets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleType {
    /// Local name of the restriction base, for example `string`.
    pub base: Option<String>,
    /// Facets in declaration order.
    pub facets: Vec<Facet>,
}

/// A restriction facet such as `xs:enumeration value="open"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    /// Facet element local name, for example `enumeration` or `maxLength`.
    pub kind: String,
    pub value: String,
}

/// A compiled schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) elements: Vec<Element>,
    pub(crate) complex_types: Vec<ComplexType>,
    pub(crate) roots: Vec<ElementId>,
    pub(crate) target_namespace: Option<String>,
}

impl Schema {
    /// Global element declarations, in document order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Looks up an element declaration.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Looks up a complex type definition.
    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.0]
    }

    /// The `targetNamespace` of the schema, if declared.
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Complex type of an element, if any.
    pub fn complex_type_of(&self, id: ElementId) -> Option<&ComplexType> {
        self.element(id)
            .complex_type()
            .map(|type_id| self.complex_type(type_id))
    }
}
