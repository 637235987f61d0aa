//! Data model for Secure File Manager
//!
//! This crate holds the types shared by every other layer:
//!
//! - **Desired state**: what the operator declares for one secure file
//! - **Content resolution**: turning a declared content source into bytes and a fingerprint
//! - **Remote representations**: secure files and authorization references as the backend reports them
//! - **Resource state**: what a caller records after a reconciliation so the next one can plan
//!
//! Nothing here talks to the network.

pub mod content;
pub mod desired;
pub mod error;
pub mod format;
pub mod manifest;
pub mod remote;
pub mod state;

pub use content::{Fingerprint, ResolvedContent, resolve};
pub use desired::{ContentSource, DesiredState};
pub use error::{Error, FieldError, Result};
pub use format::humanise_list;
pub use manifest::Manifest;
pub use remote::{
    AuthorizationReference, IdentityRef, RemoteFile, SECURE_FILE_RESOURCE_TYPE, SecureFilePatch,
    find_authorization,
};
pub use state::ResourceState;
