//! Error types for sfm-model

use std::fmt;
use std::path::PathBuf;

/// Result type for sfm-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single problem with one declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field as the operator wrote it
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur while building or resolving a desired state
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The declared state is malformed; every problem found is listed
    #[error("Invalid configuration: {}", join_problems(.problems))]
    Configuration { problems: Vec<FieldError> },

    /// A manifest file could not be parsed
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Standard I/O error
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The field problems carried by a configuration error, empty otherwise
    pub fn problems(&self) -> &[FieldError] {
        match self {
            Self::Configuration { problems } => problems,
            _ => &[],
        }
    }
}

fn join_problems(problems: &[FieldError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
