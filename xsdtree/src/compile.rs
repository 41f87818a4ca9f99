//! XSD compilation.
//!
//! Walks an `xs:schema` document with `roxmltree` and lowers it into the
//! arena model from [`crate::model`]. Only what documentation generation
//! needs is compiled: element declarations, complex type content models,
//! wildcards, and simple type restrictions. Attribute declarations are
//! skipped.

use std::{collections::HashMap, fs, path::Path};

use log::debug;
use roxmltree::{Document, Node};

use crate::{
    error::{Result, SchemaError},
    model::{
        ComplexType, ComplexTypeId, ContentType, Element, ElementId, ElementKind, Facet,
        MaxOccurs, Occurs, Particle, Schema, SequenceItem, SimpleType, Wildcard,
    },
};

/// Namespace URI of the XML Schema vocabulary.
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

impl Schema {
    /// Reads and compiles a schema file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not compile.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Schema> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Schema::parse(&text)
    }

    /// Compiles a schema from its XML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not well-formed XML, is not an
    /// `xs:schema` document, or references undeclared types or elements.
    pub fn parse(text: &str) -> Result<Schema> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !is_xs(root, "schema") {
            return Err(SchemaError::NotASchema(root.tag_name().name().to_string()));
        }

        let mut compiler = Compiler::new(&doc, root);
        for child in root.children().filter(|n| is_xs(*n, "element")) {
            let id = compiler.compile_element(child)?;
            compiler.schema.roots.push(id);
        }
        compiler.schema.target_namespace = root.attribute("targetNamespace").map(str::to_string);

        Ok(compiler.schema)
    }
}

struct Compiler<'a, 'input: 'a> {
    doc: &'a Document<'input>,
    schema: Schema,
    global_elements: HashMap<&'a str, Node<'a, 'input>>,
    named_complex: HashMap<&'a str, Node<'a, 'input>>,
    named_simple: HashMap<&'a str, Node<'a, 'input>>,
    compiled_complex: HashMap<String, ComplexTypeId>,
    /// Anonymous complex types of global elements, keyed by element name.
    compiled_global: HashMap<&'a str, ComplexTypeId>,
}

impl<'a, 'input: 'a> Compiler<'a, 'input> {
    fn new(doc: &'a Document<'input>, root: Node<'a, 'input>) -> Self {
        let mut global_elements = HashMap::new();
        let mut named_complex = HashMap::new();
        let mut named_simple = HashMap::new();

        for child in root.children().filter(|n| n.is_element()) {
            let Some(name) = child.attribute("name") else {
                continue;
            };
            if is_xs(child, "element") {
                global_elements.insert(name, child);
            } else if is_xs(child, "complexType") {
                named_complex.insert(name, child);
            } else if is_xs(child, "simpleType") {
                named_simple.insert(name, child);
            }
        }

        Self {
            doc,
            schema: Schema::default(),
            global_elements,
            named_complex,
            named_simple,
            compiled_complex: HashMap::new(),
            compiled_global: HashMap::new(),
        }
    }

    fn position(&self, node: Node<'a, 'input>) -> String {
        let pos = self.doc.text_pos_at(node.range().start);
        format!("{}:{}", pos.row, pos.col)
    }

    fn compile_element(&mut self, node: Node<'a, 'input>) -> Result<ElementId> {
        let occurs = self.parse_occurs(node)?;

        if let Some(reference) = node.attribute("ref") {
            let local = local_name(reference);
            let global = *self
                .global_elements
                .get(local)
                .ok_or_else(|| SchemaError::UnresolvedRef(local.to_string()))?;
            return self.declare(global, occurs);
        }

        if node.attribute("name").is_none() {
            return Err(SchemaError::AnonymousElement {
                position: self.position(node),
            });
        }
        self.declare(node, occurs)
    }

    fn declare(&mut self, decl: Node<'a, 'input>, occurs: Occurs) -> Result<ElementId> {
        let name = decl.attribute("name").unwrap_or_default().to_string();

        let (type_name, kind) = if let Some(type_ref) = decl.attribute("type") {
            self.resolve_type_ref(decl, &name, type_ref)?
        } else if let Some(complex) = first_xs_child(decl, "complexType") {
            (None, ElementKind::Complex(self.compile_anonymous(decl, complex)?))
        } else if let Some(simple) = first_xs_child(decl, "simpleType") {
            (None, ElementKind::Simple(compile_simple(simple)))
        } else {
            (None, ElementKind::Simple(SimpleType::default()))
        };

        let id = ElementId(self.schema.elements.len());
        self.schema.elements.push(Element {
            name,
            type_name,
            occurs,
            kind,
        });
        Ok(id)
    }

    fn resolve_type_ref(
        &mut self,
        decl: Node<'a, 'input>,
        element: &str,
        type_ref: &str,
    ) -> Result<(Option<String>, ElementKind)> {
        let (prefix, local) = split_qname(type_ref);
        let namespace = decl.lookup_namespace_uri(prefix);

        if namespace == Some(XS_NAMESPACE) {
            let simple = SimpleType {
                base: Some(local.to_string()),
                facets: Vec::new(),
            };
            return Ok((Some(local.to_string()), ElementKind::Simple(simple)));
        }

        if self.named_complex.contains_key(local) {
            let id = self.compile_named_complex(local)?;
            return Ok((Some(local.to_string()), ElementKind::Complex(id)));
        }

        if let Some(simple) = self.named_simple.get(local) {
            return Ok((
                Some(local.to_string()),
                ElementKind::Simple(compile_simple(*simple)),
            ));
        }

        Err(SchemaError::UnresolvedType {
            element: element.to_string(),
            type_name: type_ref.to_string(),
        })
    }

    fn compile_named_complex(&mut self, name: &str) -> Result<ComplexTypeId> {
        if let Some(id) = self.compiled_complex.get(name) {
            return Ok(*id);
        }
        let node = self.named_complex[name];
        debug!("compiling complex type `{name}`");
        self.compile_complex(node, Some(name))
    }

    /// Compiles the anonymous type of `decl`.
    ///
    /// A global element is compiled once, so `ref=` back to an enclosing
    /// global element resolves to the type already being compiled.
    fn compile_anonymous(
        &mut self,
        decl: Node<'a, 'input>,
        complex: Node<'a, 'input>,
    ) -> Result<ComplexTypeId> {
        let global = decl
            .parent()
            .is_some_and(|p| is_xs(p, "schema"))
            .then(|| decl.attribute("name"))
            .flatten();
        let Some(global) = global else {
            return self.compile_complex(complex, None);
        };
        if let Some(id) = self.compiled_global.get(global) {
            return Ok(*id);
        }

        let id = self.reserve_complex(None);
        self.compiled_global.insert(global, id);
        self.fill_complex(id, complex)?;
        Ok(id)
    }

    /// Reserves the type slot before compiling the body so that a type
    /// reachable from its own content model resolves to itself.
    fn compile_complex(&mut self, node: Node<'a, 'input>, name: Option<&str>) -> Result<ComplexTypeId> {
        let id = self.reserve_complex(name);
        if let Some(name) = name {
            self.compiled_complex.insert(name.to_string(), id);
        }
        self.fill_complex(id, node)?;
        Ok(id)
    }

    fn reserve_complex(&mut self, name: Option<&str>) -> ComplexTypeId {
        let id = ComplexTypeId(self.schema.complex_types.len());
        self.schema.complex_types.push(ComplexType {
            name: name.map(str::to_string),
            content: ContentType::Empty,
            particle: None,
        });
        id
    }

    fn fill_complex(&mut self, id: ComplexTypeId, node: Node<'a, 'input>) -> Result<()> {
        let (content, particle) = self.complex_body(node)?;
        let slot = &mut self.schema.complex_types[id.0];
        slot.content = content;
        slot.particle = particle;
        Ok(())
    }

    fn complex_body(&mut self, node: Node<'a, 'input>) -> Result<(ContentType, Option<Particle>)> {
        let mixed = node.attribute("mixed") == Some("true");
        let mut particle = None;

        for child in xs_children(node) {
            match child.tag_name().name() {
                "sequence" => particle = Some(Particle::Sequence(self.compile_sequence(child)?)),
                "choice" => particle = Some(Particle::Choice),
                "all" => particle = Some(Particle::All),
                "group" => {
                    let group = child.attribute("ref").unwrap_or_default();
                    particle = Some(Particle::Group(local_name(group).to_string()));
                }
                "complexContent" => particle = Some(Particle::ComplexContent),
                "simpleContent" => return Ok((ContentType::TextOnly, None)),
                _ => {}
            }
        }

        let content = if mixed {
            ContentType::Mixed
        } else if particle.is_none() {
            ContentType::Empty
        } else {
            ContentType::ElementOnly
        };
        Ok((content, particle))
    }

    fn compile_sequence(&mut self, node: Node<'a, 'input>) -> Result<Vec<SequenceItem>> {
        let mut items = Vec::new();
        for child in xs_children(node) {
            let item = match child.tag_name().name() {
                "element" => SequenceItem::Element(self.compile_element(child)?),
                "any" => SequenceItem::Any(self.compile_wildcard(child)?),
                "sequence" => SequenceItem::Nested(Particle::Sequence(self.compile_sequence(child)?)),
                "choice" => SequenceItem::Nested(Particle::Choice),
                "all" => SequenceItem::Nested(Particle::All),
                "group" => {
                    let group = child.attribute("ref").unwrap_or_default();
                    SequenceItem::Nested(Particle::Group(local_name(group).to_string()))
                }
                _ => continue,
            };
            items.push(item);
        }
        Ok(items)
    }

    fn compile_wildcard(&self, node: Node<'a, 'input>) -> Result<Wildcard> {
        Ok(Wildcard {
            process_contents: node.attribute("processContents").map(str::to_string),
            namespace: node
                .attribute("namespace")
                .filter(|ns| *ns != "##any")
                .map(str::to_string),
            occurs: self.parse_occurs(node)?,
        })
    }

    fn parse_occurs(&self, node: Node<'a, 'input>) -> Result<Occurs> {
        let mut occurs = Occurs::default();

        if let Some(value) = node.attribute("minOccurs") {
            occurs.min = value.trim().parse().map_err(|_| SchemaError::InvalidOccurs {
                attribute: "minOccurs",
                value: value.to_string(),
                position: self.position(node),
            })?;
        }

        if let Some(value) = node.attribute("maxOccurs") {
            occurs.max = match value.trim() {
                "unbounded" => MaxOccurs::Unbounded,
                bounded => MaxOccurs::Bounded(bounded.parse().map_err(|_| {
                    SchemaError::InvalidOccurs {
                        attribute: "maxOccurs",
                        value: value.to_string(),
                        position: self.position(node),
                    }
                })?),
            };
        }

        Ok(occurs)
    }
}

fn compile_simple(node: Node) -> SimpleType {
    let Some(restriction) = first_xs_child(node, "restriction") else {
        return SimpleType::default();
    };

    let facets = xs_children(restriction)
        .filter(|n| !matches!(n.tag_name().name(), "annotation" | "simpleType"))
        .map(|n| Facet {
            kind: n.tag_name().name().to_string(),
            value: n.attribute("value").unwrap_or_default().to_string(),
        })
        .collect();

    SimpleType {
        base: restriction.attribute("base").map(|b| local_name(b).to_string()),
        facets,
    }
}

fn is_xs(node: Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NAMESPACE)
        && node.tag_name().name() == local
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XS_NAMESPACE))
}

fn first_xs_child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_xs(*n, local))
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}
