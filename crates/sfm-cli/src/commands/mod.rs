//! Command implementations for sfm-cli

pub mod apply;
pub mod delete;
pub mod fingerprint;
pub mod read;

pub use apply::{run_apply, run_plan};
pub use delete::run_delete;
pub use fingerprint::run_fingerprint;
pub use read::run_read;

use std::path::Path;

use crate::error::{CliError, Result};

/// Ledger label for a manifest: the explicit one, else the file stem
pub fn label_for(manifest: &Path, label: Option<&str>) -> Result<String> {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return Ok(label.to_string());
    }
    manifest
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::user(format!(
                "Cannot derive a label from {}; pass --label",
                manifest.display()
            ))
        })
}
