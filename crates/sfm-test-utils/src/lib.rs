//! Shared test utilities for the secure-file-manager workspace.
//!
//! This crate provides standardised fixtures so crate test suites don't each
//! grow their own fakes. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`backend`]: [`FakeBackend`], an in-memory backend implementing both store traits
//! - [`fixtures`]: desired-state and manifest fixtures

pub mod backend;
pub mod fixtures;

pub use backend::{Call, CallKind, FakeBackend};
