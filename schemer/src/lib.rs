//! # schemer
//!
//! Regenerates the reference topics of an XML schema while carrying over the
//! prose that writers already put into the existing topics.
//!
//! A run has three phases:
//!
//! - **Survey**: walk the schema into a tree of topics, mining the legacy
//!   topic of every element on the way
//! - **Generate**: write one markdown topic per structural element, plus an
//!   "all elements" landing page, into a sibling `<folder>_gen` directory
//! - **Commit**: delete legacy topics that have been superseded
//!
//! ## Modules
//!
//! - [`config`] - Project configuration (`.schemer.toml`)
//! - [`ctx`] - Run context shared by every phase
//! - [`overrides`] - Hand-written override rules
//! - [`survey`] - Schema walk and tree construction
//! - [`tree`] - The topic tree
//! - [`generate`] - Topic and landing page rendering
//! - [`commit`] - Legacy topic removal
//! - [`report`] - End-of-run logs
//! - [`utils`] - Common utilities and helper functions
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use schemer::{config::SchemerConfig, report::RunReport};
//!
//! let mut report = RunReport::new();
//! let ctx = SchemerConfig::load(Path::new(".schemer.toml"))
//!     .unwrap()
//!     .into_context(&mut report)
//!     .unwrap();
//! let tree = schemer::survey::survey(&ctx, ctx.load_schema().unwrap()).unwrap();
//! schemer::generate::generate(&ctx, &tree, &mut report).unwrap();
//! report.print();
//! ```

/// Legacy topic removal.
pub mod commit;

/// Project configuration loading and validation.
pub mod config;

/// Run context shared by every phase.
pub mod ctx;

/// Topic and landing page rendering.
///
/// Rendering is pure: every page is built in memory from the tree, the
/// mined legacy content and the override rules, then written once.
pub mod generate;

/// Hand-written override rules loaded from the sidecar file.
pub mod overrides;

/// End-of-run logs.
pub mod report;

/// Schema walk and topic tree construction.
pub mod survey;

/// The topic tree.
pub mod tree;

/// Common utilities and helper functions.
pub mod utils;

#[cfg(test)]
mod testutil;

#[macro_use]
extern crate log;
