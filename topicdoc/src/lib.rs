//! # topicdoc
//!
//! A markdown model for schema reference topics.
//!
//! Topicdoc reads the reference pages a documentation set already has, so
//! their hand-written prose can be carried over into regenerated pages.
//!
//! ## Features
//!
//! - YAML frontmatter parsing and rendering (flat scalars and lists)
//! - Markdown pipe tables with cell normalisation for name lookups
//! - A line-oriented miner that extracts title, description, syntax,
//!   child-element table, per-child subsections, remarks, examples and
//!   requirements from an existing topic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topicdoc::ExistingTopic;
//!
//! if let Some(topic) = ExistingTopic::mine("wlan-profileschema-security-msm-element.md").unwrap() {
//!     println!("{:?}", topic.subsection("OneXEnabled"));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types for table and topic parsing
//! - [`frontmatter`] - The YAML block at the top of a topic
//! - [`table`] - Markdown tables
//! - [`topic`] - Legacy topic mining

#[macro_use]
extern crate log;

pub mod error;

pub mod frontmatter;

/// Markdown pipe tables.
pub mod table;

/// Legacy topic mining.
pub mod topic;

pub use error::{TableError, TopicError};
pub use frontmatter::{Frontmatter, FrontmatterEntry, FrontmatterValue};
pub use table::{Table, normalize_cell};
pub use topic::{ExistingTopic, Subsection};
