//! Error types for convtest-core.
//!
//! The detection and generation pipeline itself never fails: unresolvable
//! types produce empty member lists and unmet fix preconditions produce
//! `None`. Errors only come from host-side operations such as parsing,
//! loading configuration, file I/O and applying edits.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::DocumentId;

/// Result type alias using convtest-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hosting the scaffolding pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Source text could not be parsed
    #[error("Parse error in {path}:{line}:{column}: {message}")]
    Parse {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid glob pattern for a directory scan
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The tree-edit collaborator rejected a replacement
    #[error("Edit rejected: {0}")]
    Edit(String),

    /// A document id that the workspace does not know
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
}

impl Error {
    /// Create a parse error.
    pub fn parse(
        path: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an edit error.
    pub fn edit(message: impl Into<String>) -> Self {
        Self::Edit(message.into())
    }
}
