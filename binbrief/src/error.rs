//! Error types for loading briefs and building agent systems.

use std::io;
use std::path::PathBuf;

use libbrief::ParseError;
use thiserror::Error;

/// Result type for brief operations.
pub type Result<T> = std::result::Result<T, BriefError>;

/// Error raised while turning a brief into an agent system.
#[derive(Error, Debug)]
pub enum BriefError {
    /// The brief text is not structurally valid.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The brief parsed, but its root is not a mapping.
    #[error("Brief YAML must be a mapping at the top level.")]
    NotAMapping,

    /// A field has a shape the brief does not allow.
    #[error("{0}")]
    InvalidField(String),

    /// A brief-supplied path would escape the output directory.
    #[error("Path '{0}' must be relative and stay inside the output directory.")]
    UnsafePath(String),

    /// The brief file does not exist.
    #[error("Brief file not found: {}", .0.display())]
    BriefNotFound(PathBuf),

    /// The output directory already has content.
    #[error("Output path '{}' is not empty.", .0.display())]
    OutputNotEmpty(PathBuf),

    /// A file every generated system needs was not produced.
    #[error("Missing required file: {0}")]
    MissingRequiredFile(String),

    /// Filesystem failure, with the path involved.
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BriefError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BriefError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BriefError::InvalidField(message.into())
    }
}
