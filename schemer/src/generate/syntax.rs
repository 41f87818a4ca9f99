//! XSD syntax blocks.
//!
//! Always regenerated from the schema. A node's block shows its own element
//! declaration wrapping one tag per child, in sequence order:
//!
//! ```text
//! <xs:element name="security"
//!     minOccurs="0"
//!  >
//!     <xs:complexType>
//!         <xs:sequence>
//!             <xs:element name="OneXEnabled"
//!                 minOccurs="0"
//!                 type="boolean"
//!              />
//!         </xs:sequence>
//!     </xs:complexType>
//! </xs:element>
//! ```

use xsdtree::{Element, Occurs, SimpleType, Wildcard};

use crate::{
    ctx::AppContext,
    tree::{ChildAdapter, NodeId, TopicTree},
    utils::{CONTENT_INDENT, indent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close {
    Open,
    SelfClose,
}

#[derive(Debug, Default)]
struct SyntaxWriter {
    out: String,
    indent: usize,
}

impl SyntaxWriter {
    fn line(&mut self, text: &str) {
        self.out.push_str(&indent(self.indent));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn push(&mut self) {
        self.indent += CONTENT_INDENT;
    }

    fn pop(&mut self) {
        self.indent = self.indent.saturating_sub(CONTENT_INDENT);
    }

    /// Writes `<tag` followed by one attribute per line, then `>` or `/>`.
    fn tag(&mut self, head: &str, attributes: &[String], close: Close) {
        self.out.push_str(&indent(self.indent));
        self.out.push_str(head);
        if !attributes.is_empty() {
            self.out.push('\n');
            for attribute in attributes {
                self.out.push_str(&indent(self.indent + CONTENT_INDENT));
                self.out.push_str(attribute);
                self.out.push('\n');
            }
            self.out.push_str(&indent(self.indent + 1));
        }
        self.out.push_str(match close {
            Close::Open => ">\n",
            Close::SelfClose => "/>\n",
        });
    }

    fn element(&mut self, element: &Element, close: Close, elided: bool) {
        let mut attributes = occurs_attributes(&element.occurs);
        if let Some(type_name) = &element.type_name {
            attributes.push(format!("type=\"{type_name}\""));
        }
        if elided {
            attributes.push("...".to_string());
        }
        self.tag(
            &format!("<xs:element name=\"{}\"", element.name),
            &attributes,
            close,
        );
    }

    fn restriction(&mut self, simple: &SimpleType, base: &str) {
        self.line("<xs:simpleType>");
        self.push();
        self.line(&format!("<xs:restriction base=\"xs:{base}\">"));
        self.push();
        for facet in &simple.facets {
            self.line(&format!("<xs:{} value=\"{}\"/>", facet.kind, facet.value));
        }
        self.pop();
        self.line("</xs:restriction>");
        self.pop();
        self.line("</xs:simpleType>");
    }

    fn wildcard(&mut self, wildcard: &Wildcard) {
        let mut attributes = Vec::new();
        if let Some(process_contents) = wildcard
            .process_contents
            .as_ref()
            .filter(|p| p.as_str() != "strict")
        {
            attributes.push(format!("processContents=\"{process_contents}\""));
        }
        attributes.extend(occurs_attributes(&wildcard.occurs));
        if let Some(namespace) = &wildcard.namespace {
            attributes.push(format!("namespace=\"{namespace}\""));
        }
        self.tag("<xs:any", &attributes, Close::SelfClose);
    }
}

fn occurs_attributes(occurs: &Occurs) -> Vec<String> {
    let mut attributes = Vec::new();
    if occurs.has_explicit_min() {
        attributes.push(format!("minOccurs=\"{}\"", occurs.min));
    }
    if occurs.has_explicit_max() {
        attributes.push(format!("maxOccurs=\"{}\"", occurs.max));
    }
    attributes
}

/// An anonymous restriction that is worth spelling out inline.
fn inline_restriction(element: &Element) -> Option<(&SimpleType, &str)> {
    if element.type_name.is_some() {
        return None;
    }
    let simple = element.simple_type()?;
    let base = simple.base.as_deref()?;
    Some((simple, base))
}

/// Renders the body of the syntax block for node `id`, without the fences.
pub fn render_syntax(ctx: &AppContext, tree: &TopicTree, id: NodeId) -> String {
    let schema = tree.schema();
    let node = tree.node(id);
    let mut w = SyntaxWriter::default();

    w.element(tree.element(id), Close::Open, false);
    w.push();
    w.line("<xs:complexType>");
    w.push();
    w.line("<xs:sequence>");
    w.push();

    for child in &node.children {
        match child {
            ChildAdapter::Topic(child_id) => {
                w.element(tree.element(*child_id), Close::SelfClose, true);
            }
            ChildAdapter::Leaf(leaf) => {
                let element = schema.element(leaf.element);
                match inline_restriction(element) {
                    Some((simple, base)) => {
                        w.element(element, Close::Open, false);
                        w.push();
                        w.restriction(simple, base);
                        w.pop();
                        w.line("</xs:element>");
                    }
                    None => w.element(element, Close::SelfClose, false),
                }

                let key = tree.child_qualified_name(id, child);
                if let Some(comment) = ctx.overrides.syntax_comment_after(&key) {
                    w.out.push_str(&comment.render(w.indent));
                }
            }
        }
    }

    if let Some(wildcard) = &node.wildcard {
        w.wildcard(wildcard);
    }

    w.pop();
    w.line("</xs:sequence>");
    w.pop();
    w.line("</xs:complexType>");
    w.pop();
    w.line("</xs:element>");
    w.out
}
