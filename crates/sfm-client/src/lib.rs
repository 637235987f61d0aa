//! Azure DevOps REST client for Secure File Manager
//!
//! [`DevOpsClient`] implements both [`sfm_core::SecureFileStore`] and
//! [`sfm_core::AuthorizationStore`] over HTTPS with a personal access token.
//! Build one from [`ClientOptions`] and hand a clone to each side of the
//! engine:
//!
//! ```rust,no_run
//! use sfm_client::{ClientOptions, DevOpsClient};
//! use sfm_core::ReconciliationEngine;
//!
//! # fn main() -> Result<(), sfm_client::Error> {
//! let client = DevOpsClient::new(&ClientOptions::from_env())?;
//! let engine = ReconciliationEngine::new(Box::new(client.clone()), Box::new(client));
//! # Ok(())
//! # }
//! ```

mod authorizations;
pub mod client;
pub mod error;
pub mod options;
mod secure_files;

pub use client::{API_VERSION, DevOpsClient};
pub use error::{Error, Result};
pub use options::{
    ClientOptions, DEFAULT_TIMEOUT, ORG_SERVICE_URL_ENV, PERSONAL_ACCESS_TOKEN_ENV,
};
