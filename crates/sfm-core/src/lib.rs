//! Reconciliation engine for Secure File Manager
//!
//! This crate converges a remote backend onto a declared [`DesiredState`]:
//!
//! - **Store traits**: [`SecureFileStore`] and [`AuthorizationStore`] are the two
//!   remote resource groups the engine drives; transports implement them
//! - **Error classification**: remote failures become NotFound, Validation, or Remote
//! - **ReconciliationEngine**: create, read, update, delete and apply with fixed call ordering
//! - **Planning**: decide between create, replace, update and no-op from recorded state
//!
//! # Architecture
//!
//! ```text
//!              CLI / caller
//!                   |
//!               sfm-core  ----- sfm-model
//!                   |
//!     SecureFileStore + AuthorizationStore
//!                   |
//!         sfm-client (HTTP) / fakes
//! ```
//!
//! [`DesiredState`]: sfm_model::DesiredState

pub mod classify;
pub mod context;
pub mod engine;
pub mod error;
pub mod plan;
pub mod store;

pub use classify::{ErrorKind, classify, classify_status};
pub use context::{CallContext, Interrupt};
pub use engine::{ApplyReport, Created, Observed, ReadOutcome, ReconciliationEngine};
pub use error::{Error, Operation, Result, Target};
pub use plan::{Change, Plan, ReplaceReason, plan};
pub use store::{
    ActionFilter, ApiError, AuthorizationFilter, AuthorizationStore, GetOptions, SecureFileStore,
    StoreError, StoreResult, UploadRequest, require_non_empty,
};
