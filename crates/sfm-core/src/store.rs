//! Store traits the engine drives
//!
//! The engine never talks to a transport directly. It is handed one
//! [`SecureFileStore`] and one [`AuthorizationStore`] at construction and
//! issues every remote call through them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sfm_model::{AuthorizationReference, RemoteFile, SecureFilePatch};
use uuid::Uuid;

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A non-success response from the backend, normalized to status and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    /// Backend exception type, when the body carried one
    pub type_key: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            type_key: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)?;
        if let Some(type_key) = &self.type_key {
            write!(f, " ({type_key})")?;
        }
        Ok(())
    }
}

/// Errors raised by store implementations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused to issue the call because a required argument is missing
    #[error("Argument {argument} cannot be nil or empty")]
    MissingArgument { argument: String },

    /// The backend answered with a non-success status
    #[error("{0}")]
    Api(ApiError),

    /// The request never produced a usable response
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl StoreError {
    pub fn missing(argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            argument: argument.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api(ApiError::new(status, message))
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Reject an empty argument before any network call
///
/// # Errors
///
/// Returns [`StoreError::MissingArgument`] naming `argument` when `value` is empty.
pub fn require_non_empty(argument: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        Err(StoreError::missing(argument))
    } else {
        Ok(())
    }
}

/// Which secure files the caller may act on when fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFilter {
    None,
    Manage,
    Use,
}

impl ActionFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Manage => "manage",
            Self::Use => "use",
        }
    }
}

/// Optional query flags for fetching a secure file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub include_download_ticket: Option<bool>,
    pub action_filter: Option<ActionFilter>,
}

/// A new secure file to upload
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub project: String,
    pub name: String,
    pub content: Vec<u8>,
    pub authorize_pipelines: Option<bool>,
}

// Content is secret; keep it out of logs.
impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("project", &self.project)
            .field("name", &self.name)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("authorize_pipelines", &self.authorize_pipelines)
            .finish()
    }
}

/// Filter for listing authorization references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationFilter {
    pub resource_type: Option<String>,
    pub id: Option<String>,
}

impl AuthorizationFilter {
    /// Filter matching one secure file
    pub fn secure_file(id: Uuid) -> Self {
        Self {
            resource_type: Some(sfm_model::SECURE_FILE_RESOURCE_TYPE.to_string()),
            id: Some(id.to_string()),
        }
    }
}

/// CRUD over secure files scoped by project
#[async_trait]
pub trait SecureFileStore: Send + Sync {
    /// Upload new content; the backend assigns the identity.
    async fn upload(&self, request: UploadRequest) -> StoreResult<RemoteFile>;

    /// Fetch one secure file.
    async fn get(&self, project: &str, file_id: Uuid, options: GetOptions)
    -> StoreResult<RemoteFile>;

    /// Replace name and properties of an existing secure file.
    async fn update(
        &self,
        project: &str,
        file_id: Uuid,
        patch: &SecureFilePatch,
    ) -> StoreResult<RemoteFile>;

    /// Delete a secure file.
    async fn delete(&self, project: &str, file_id: Uuid) -> StoreResult<()>;
}

/// List and patch per-project resource authorizations
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    async fn list(
        &self,
        project: &str,
        filter: &AuthorizationFilter,
    ) -> StoreResult<Vec<AuthorizationReference>>;

    /// Apply references and return the effective list the backend reports.
    async fn patch(
        &self,
        project: &str,
        references: &[AuthorizationReference],
    ) -> StoreResult<Vec<AuthorizationReference>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_non_empty_names_the_argument() {
        assert_eq!(
            require_non_empty("args.Project", " "),
            Err(StoreError::missing("args.Project"))
        );
        assert!(require_non_empty("args.Project", "demo").is_ok());
    }

    #[test]
    fn upload_request_debug_hides_content() {
        let request = UploadRequest {
            project: "demo".into(),
            name: "cert.pfx".into(),
            content: b"secret".to_vec(),
            authorize_pipelines: None,
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<6 bytes>"));
    }

    #[test]
    fn api_error_display_includes_type_key() {
        let mut err = ApiError::new(400, "VS800075: project missing");
        err.type_key = Some("ProjectDoesNotExistException".into());
        let display = StoreError::Api(err).to_string();
        assert!(display.contains("HTTP 400"));
        assert!(display.contains("ProjectDoesNotExistException"));
    }
}
