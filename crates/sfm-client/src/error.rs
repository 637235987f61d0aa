//! Error types for sfm-client

/// Result type for building a client
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a [`crate::DevOpsClient`]
///
/// Failures of individual calls are reported as [`sfm_core::StoreError`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed connection options
    #[error(transparent)]
    Configuration(#[from] sfm_model::Error),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
