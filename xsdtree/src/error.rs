//! Error types for schema compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while reading or compiling an XSD file.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed XML.
    #[error("schema is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document element is not `xs:schema`.
    #[error("document element is `{0}`, expected `xs:schema`")]
    NotASchema(String),

    /// An element declaration carries neither `name` nor `ref`.
    #[error("element declaration at {position} has neither a name nor a ref")]
    AnonymousElement { position: String },

    /// A `type=` attribute names a type that is not declared in the file.
    #[error("element `{element}` refers to undeclared type `{type_name}`")]
    UnresolvedType { element: String, type_name: String },

    /// A `ref=` attribute names a global element that is not declared in the file.
    #[error("reference to undeclared global element `{0}`")]
    UnresolvedRef(String),

    /// `minOccurs` or `maxOccurs` is not a valid occurrence value.
    #[error("invalid {attribute} value `{value}` at {position}")]
    InvalidOccurs {
        attribute: &'static str,
        value: String,
        position: String,
    },
}

impl SchemaError {
    /// Creates an I/O error for the given schema path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }
}
