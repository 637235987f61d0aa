//! Fingerprint command implementation

use std::path::Path;

use sfm_model::Manifest;

use crate::error::Result;

/// Print the SHA-256 fingerprint of the manifest's content, nothing else.
pub fn run_fingerprint(manifest: &Path) -> Result<()> {
    let desired = Manifest::load(manifest)?.into_desired()?;
    println!("{}", desired.fingerprint()?);
    Ok(())
}
