//! The topic tree.
//!
//! Nodes live in an arena owned by [`TopicTree`]; parents and children refer
//! to each other by [`NodeId`]. Only structural elements get a node. Leaf
//! elements are stored inline in their parent's child list.

use std::path::PathBuf;

use colored::Colorize;
use topicdoc::ExistingTopic;
use xsdtree::{Element, ElementId, Schema, Wildcard};

use crate::utils::{CONSOLE_INDENT, indent};

/// Index of a [`TopicNode`] in a [`TopicTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A child documented inside its parent's topic.
#[derive(Debug, Clone)]
pub struct LeafChild {
    pub element: ElementId,
    /// The leaf's own legacy topic, if one exists.
    pub mined: Option<ExistingTopic>,
    pub legacy_path: PathBuf,
}

/// One entry of a node's child list, in schema sequence order.
#[derive(Debug, Clone)]
pub enum ChildAdapter {
    /// A structural child with its own topic.
    Topic(NodeId),
    /// A leaf child documented inline.
    Leaf(LeafChild),
}

/// A structural element that gets its own topic.
#[derive(Debug, Clone)]
pub struct TopicNode {
    pub element: ElementId,
    pub parent: Option<NodeId>,
    pub children: Vec<ChildAdapter>,
    pub mined: Option<ExistingTopic>,
    /// Set when the content model ends in an `xs:any` extension point.
    pub wildcard: Option<Wildcard>,
    pub legacy_path: PathBuf,
    pub generated_path: PathBuf,
}

/// The tree produced by the survey, together with the schema it documents.
#[derive(Debug, Clone)]
pub struct TopicTree {
    schema: Schema,
    nodes: Vec<TopicNode>,
    root: NodeId,
}

/// `Name` at the root, `Name (Parent)` below it.
pub fn qualify(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("{name} ({parent})"),
        None => name.to_string(),
    }
}

impl TopicTree {
    pub(crate) fn new(schema: Schema, nodes: Vec<TopicNode>, root: NodeId) -> Self {
        Self {
            schema,
            nodes,
            root,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TopicNode {
        &self.nodes[id.0]
    }

    /// Number of topic nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: NodeId) -> &Element {
        self.schema.element(self.node(id).element)
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.element(id).name
    }

    pub fn parent_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).parent.map(|p| self.name(p))
    }

    /// Override key of a node.
    pub fn qualified_name(&self, id: NodeId) -> String {
        qualify(self.name(id), self.parent_name(id))
    }

    /// Name of the element behind a child entry.
    pub fn child_name(&self, child: &ChildAdapter) -> &str {
        match child {
            ChildAdapter::Topic(id) => self.name(*id),
            ChildAdapter::Leaf(leaf) => &self.schema.element(leaf.element).name,
        }
    }

    /// Override key of a child entry of `parent`.
    pub fn child_qualified_name(&self, parent: NodeId, child: &ChildAdapter) -> String {
        qualify(self.child_name(child), Some(self.name(parent)))
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        depth
    }

    /// Topic children of `id`, in schema order.
    pub fn topic_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().filter_map(|c| match c {
            ChildAdapter::Topic(child) => Some(*child),
            ChildAdapter::Leaf(_) => None,
        })
    }

    /// Every node, depth-first, parents before children, siblings in schema order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children: Vec<NodeId> = self.topic_children(id).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Every leaf child in the tree, with the node that owns it.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &LeafChild)> + '_ {
        self.pre_order().into_iter().flat_map(move |id| {
            self.node(id).children.iter().filter_map(move |c| match c {
                ChildAdapter::Leaf(leaf) => Some((id, leaf)),
                ChildAdapter::Topic(_) => None,
            })
        })
    }

    /// Prints the tree, one element per line.
    pub fn print(&self) {
        println!();
        println!("Printing out tree of topics...");
        self.print_node(self.root, 0);
    }

    fn print_node(&self, id: NodeId, indent_by: usize) {
        println!("{}{}", indent(indent_by), format!("{} element", self.name(id)).bold());
        for child in &self.node(id).children {
            match child {
                ChildAdapter::Topic(child) => self.print_node(*child, indent_by + CONSOLE_INDENT),
                ChildAdapter::Leaf(_) => println!(
                    "{}{} element",
                    indent(indent_by + CONSOLE_INDENT),
                    self.child_name(child)
                ),
            }
        }
    }
}
