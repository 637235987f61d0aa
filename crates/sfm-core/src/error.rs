//! Error types for sfm-core

use std::fmt;

use uuid::Uuid;

use crate::classify::{ErrorKind, classify};
use crate::context::Interrupt;
use crate::store::StoreError;

/// Result type for sfm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single remote step the engine performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    UpdateMetadata,
    Get,
    ListAuthorizations,
    Authorize,
    Deauthorize,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upload => "upload secure file",
            Self::UpdateMetadata => "update secure file",
            Self::Get => "get secure file",
            Self::ListAuthorizations => "list resource authorizations",
            Self::Authorize => "authorize secure file",
            Self::Deauthorize => "deauthorize secure file",
            Self::Delete => "delete secure file",
        };
        f.write_str(name)
    }
}

/// Identifiers a remote step was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub project_id: Uuid,
    pub file_id: Option<Uuid>,
}

impl Target {
    pub fn project(project_id: Uuid) -> Self {
        Self {
            project_id,
            file_id: None,
        }
    }

    pub fn file(project_id: Uuid, file_id: Uuid) -> Self {
        Self {
            project_id,
            file_id: Some(file_id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_id {
            Some(file_id) => write!(f, "project {}, secure file {}", self.project_id, file_id),
            None => write!(f, "project {}", self.project_id),
        }
    }
}

/// Errors that can occur during reconciliation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The desired state is malformed; no remote call was made
    #[error(transparent)]
    Configuration(#[from] sfm_model::Error),

    /// A store refused to issue a call
    #[error("Validation error during {operation} ({target}): {source}")]
    Validation {
        operation: Operation,
        target: Target,
        #[source]
        source: StoreError,
    },

    /// The resource an update or delete needs does not exist
    #[error("Not found during {operation} ({target}): {source}")]
    NotFound {
        operation: Operation,
        target: Target,
        #[source]
        source: StoreError,
    },

    /// Any other remote failure
    #[error("Failed to {operation} ({target}): {source}")]
    Remote {
        operation: Operation,
        target: Target,
        #[source]
        source: StoreError,
    },

    /// The call context fired before the step finished
    #[error("{operation} {reason} ({target})")]
    Interrupted {
        operation: Operation,
        target: Target,
        reason: Interrupt,
    },

    /// The backend answered but the answer is unusable
    #[error("Unexpected response during {operation} ({target}): {message}")]
    UnexpectedResponse {
        operation: Operation,
        target: Target,
        message: String,
    },
}

impl Error {
    /// Wrap a store failure according to its classification
    pub fn from_store(operation: Operation, target: Target, source: StoreError) -> Self {
        match classify(&source) {
            ErrorKind::NotFound => Self::NotFound {
                operation,
                target,
                source,
            },
            ErrorKind::Validation => Self::Validation {
                operation,
                target,
                source,
            },
            ErrorKind::Remote => Self::Remote {
                operation,
                target,
                source,
            },
        }
    }

    /// Semantic kind of this error, if it came from a store
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotFound { .. } => Some(ErrorKind::NotFound),
            Self::Validation { .. } => Some(ErrorKind::Validation),
            Self::Remote { .. } => Some(ErrorKind::Remote),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The remote step that failed, when there was one
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Validation { operation, .. }
            | Self::NotFound { operation, .. }
            | Self::Remote { operation, .. }
            | Self::Interrupted { operation, .. }
            | Self::UnexpectedResponse { operation, .. } => Some(*operation),
            Self::Configuration(_) => None,
        }
    }
}
