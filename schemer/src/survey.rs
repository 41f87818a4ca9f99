//! Survey phase: schema walk and topic tree construction.
//!
//! Elements are visited pre-order from the single global element. A node is
//! created for an element the first time one of its particles turns out to
//! be an element, so an element whose type declares no child elements never
//! gets a topic and is recorded as a leaf of its parent instead. Every node
//! and leaf mines its predicted legacy topic as soon as it is created.

use std::path::Path;

use colored::Colorize;
use thiserror::Error;
use topicdoc::{ExistingTopic, TopicError};
use xsdtree::{ComplexTypeId, ContentType, ElementId, Particle, Schema, SequenceItem, Wildcard};

use crate::{
    ctx::AppContext,
    tree::{ChildAdapter, LeafChild, NodeId, TopicNode, TopicTree},
    utils::{CONSOLE_INDENT, indent},
};

/// Schema shapes the generator cannot document. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error(
        "the schema declares {0} global elements; exactly one root element is supported"
    )]
    RootCount(usize),

    #[error("the root element `{0}` has no child elements, so there is nothing to document")]
    RootIsLeaf(String),

    #[error("element `{element}` uses an `xs:{compositor}` content model; only a flat xs:sequence is supported")]
    UnsupportedParticle {
        element: String,
        compositor: &'static str,
    },

    #[error("element `{element}` has {content:?} content; complex types may contain only elements")]
    UnsupportedContent {
        element: String,
        content: ContentType,
    },

    #[error("element `{element}` nests its own type `{type_name}`")]
    RecursiveType { element: String, type_name: String },

    #[error(transparent)]
    Mine(#[from] TopicError),
}

/// Builds the topic tree for `schema`, printing the survey as it goes.
pub fn survey(ctx: &AppContext, schema: Schema) -> Result<TopicTree, SurveyError> {
    println!("{}", "*** SURVEY PHASE ***".bold());
    println!();

    let roots = schema.roots();
    if roots.len() != 1 {
        return Err(SurveyError::RootCount(roots.len()));
    }
    let root = roots[0];

    let nodes = {
        let mut builder = Builder {
            ctx,
            schema: &schema,
            nodes: Vec::new(),
            type_path: Vec::new(),
        };
        builder.visit(None, root, 0)?;
        builder.nodes
    };

    if nodes.is_empty() {
        return Err(SurveyError::RootIsLeaf(schema.element(root).name.clone()));
    }

    let tree = TopicTree::new(schema, nodes, NodeId(0));
    info!(
        "survey found {} topics and {} leaf elements",
        tree.len(),
        tree.leaves().count()
    );
    Ok(tree)
}

struct Builder<'a> {
    ctx: &'a AppContext,
    schema: &'a Schema,
    nodes: Vec<TopicNode>,
    /// Complex types on the path from the root to the element being visited.
    type_path: Vec<ComplexTypeId>,
}

impl<'a> Builder<'a> {
    fn visit(
        &mut self,
        parent: Option<NodeId>,
        element_id: ElementId,
        indent_by: usize,
    ) -> Result<(), SurveyError> {
        let schema = self.schema;
        let element = schema.element(element_id);
        let parent_name = parent.map(|p| schema.element(self.nodes[p.0].element).name.as_str());

        print!(
            "{}{} (",
            indent(indent_by),
            format!("{} element", element.name).bold()
        );

        let mut node = None;

        if let Some(type_id) = element.complex_type() {
            let complex = schema.complex_type(type_id);
            if matches!(complex.content, ContentType::TextOnly | ContentType::Mixed) {
                println!();
                return Err(SurveyError::UnsupportedContent {
                    element: element.name.clone(),
                    content: complex.content,
                });
            }
            if self.type_path.contains(&type_id) {
                println!();
                return Err(SurveyError::RecursiveType {
                    element: element.name.clone(),
                    type_name: complex.name.clone().unwrap_or_else(|| element.name.clone()),
                });
            }

            self.type_path.push(type_id);
            match &complex.particle {
                None => {}
                Some(Particle::Sequence(items)) => {
                    let mut pending_wildcard: Option<Wildcard> = None;
                    for item in items {
                        match item {
                            SequenceItem::Element(child) => {
                                let id = match node {
                                    Some(id) => id,
                                    None => {
                                        let id = self.create_node(
                                            parent,
                                            parent_name,
                                            element_id,
                                            pending_wildcard.take(),
                                        )?;
                                        node = Some(id);
                                        id
                                    }
                                };
                                self.visit(Some(id), *child, indent_by + CONSOLE_INDENT)?;
                            }
                            SequenceItem::Any(wildcard) => match node {
                                Some(id) => self.nodes[id.0].wildcard = Some(wildcard.clone()),
                                None => pending_wildcard = Some(wildcard.clone()),
                            },
                            SequenceItem::Nested(nested) => {
                                println!();
                                return Err(SurveyError::UnsupportedParticle {
                                    element: element.name.clone(),
                                    compositor: nested.compositor(),
                                });
                            }
                        }
                    }
                }
                Some(other) => {
                    println!();
                    return Err(SurveyError::UnsupportedParticle {
                        element: element.name.clone(),
                        compositor: other.compositor(),
                    });
                }
            }
            self.type_path.pop();
        }

        if node.is_none() {
            self.add_leaf(parent, parent_name, element_id)?;
        }
        Ok(())
    }

    fn create_node(
        &mut self,
        parent: Option<NodeId>,
        parent_name: Option<&str>,
        element_id: ElementId,
        wildcard: Option<Wildcard>,
    ) -> Result<NodeId, SurveyError> {
        let schema = self.schema;
        let name = &schema.element(element_id).name;
        let generated_path = self.ctx.generated_topic(name, parent_name);
        let legacy_path = self.ctx.legacy_topic(name, parent_name);
        println!("will create {})", generated_path.display());

        let mined = mine(&legacy_path)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(TopicNode {
            element: element_id,
            parent,
            children: Vec::new(),
            mined,
            wildcard,
            legacy_path,
            generated_path,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(ChildAdapter::Topic(id));
        }
        Ok(id)
    }

    fn add_leaf(
        &mut self,
        parent: Option<NodeId>,
        parent_name: Option<&str>,
        element_id: ElementId,
    ) -> Result<(), SurveyError> {
        let schema = self.schema;
        let name = &schema.element(element_id).name;
        let legacy_path = self.ctx.legacy_topic(name, parent_name);
        let mined = mine(&legacy_path)?;
        match &mined {
            Some(_) => println!("will delete {})", legacy_path.display()),
            None => println!("nothing to delete)"),
        }

        let Some(parent) = parent else {
            return Err(SurveyError::RootIsLeaf(name.clone()));
        };
        self.nodes[parent.0].children.push(ChildAdapter::Leaf(LeafChild {
            element: element_id,
            mined,
            legacy_path,
        }));
        Ok(())
    }
}

fn mine(path: &Path) -> Result<Option<ExistingTopic>, TopicError> {
    let mined = ExistingTopic::mine(path)?;
    if mined.is_some() {
        debug!("mined {}", path.display());
    }
    Ok(mined)
}
