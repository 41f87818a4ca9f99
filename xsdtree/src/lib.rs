//! # xsdtree - XML Schema compilation for documentation tooling
//!
//! A small library that compiles a single-file XML Schema (XSD) into an
//! arena of element declarations and complex types.
//!
//! ## Features
//!
//! - Global elements, `ref=` resolution, named and anonymous complex types
//! - Flat content models (`xs:sequence`) with nested compositors kept as markers
//! - `xs:any` wildcards with their `processContents`/`namespace` attributes
//! - Simple type restrictions with their facets
//! - Recursive named types without infinite expansion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xsdtree::Schema;
//!
//! let schema = Schema::from_file("WLAN_profile_v1.xsd").unwrap();
//! for root in schema.roots() {
//!     println!("{}", schema.element(*root).name);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`compile`] - XSD to arena compilation
//! - [`error`] - Error types and result definitions
//! - [`model`] - The compiled schema model

/// XSD to arena compilation.
pub mod compile;

/// Error types and result definitions for schema compilation.
pub mod error;

/// Compiled schema model: elements, complex types, particles, wildcards.
pub mod model;

pub use compile::XS_NAMESPACE;
pub use error::{Result, SchemaError};
pub use model::{
    ComplexType, ComplexTypeId, ContentType, Element, ElementId, ElementKind, Facet, MaxOccurs,
    Occurs, Particle, Schema, SequenceItem, SimpleType, Wildcard,
};
