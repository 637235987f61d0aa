//! Error types for sfm-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from sfm-core
    #[error(transparent)]
    Core(#[from] sfm_core::Error),

    /// Error from sfm-model
    #[error(transparent)]
    Model(#[from] sfm_model::Error),

    /// Error from sfm-client
    #[error(transparent)]
    Client(#[from] sfm_client::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Ledger file could not be read or written
    #[error("State ledger at {path}: {message}")]
    Ledger { path: PathBuf, message: String },

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    pub fn ledger(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Ledger {
            path: path.into(),
            message: message.into(),
        }
    }
}
