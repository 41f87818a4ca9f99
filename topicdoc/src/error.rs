use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while tokenising a markdown table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// A row's cell count differs from the heading row's.
    #[error("{file}:{line}: table row has {found} cells, heading row has {expected}")]
    CellCountMismatch {
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while mining an existing topic file.
#[derive(Debug, Error)]
pub enum TopicError {
    /// The topic file exists but could not be read.
    #[error("failed to read topic {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line of the file is not the `---` frontmatter delimiter.
    #[error("{path}: the first line of a topic file must be `---`")]
    MissingFrontmatter { path: PathBuf },

    /// The frontmatter block is never closed.
    #[error("{path}: the YAML frontmatter is not terminated by `---`")]
    UnterminatedFrontmatter { path: PathBuf },

    /// The frontmatter block is not a YAML mapping.
    #[error("{path}: invalid YAML frontmatter: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Prose was found between the frontmatter and the H1.
    #[error("{path}:{line}: only whitespace may appear between the YAML frontmatter and the H1")]
    ContentBeforeHeading { path: PathBuf, line: usize },

    /// A table inside the topic is malformed.
    #[error(transparent)]
    Table(#[from] TableError),
}
