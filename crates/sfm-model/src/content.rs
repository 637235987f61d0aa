//! Content resolution and fingerprinting
//!
//! Secure file content is write-only: once uploaded it is never read back.
//! The fingerprint (lowercase hex SHA-256 of the raw bytes) is what callers
//! persist and compare to detect content drift.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::desired::{CONTENT_BASE64_FIELD, CONTENT_FIELD, ContentSource};
use crate::error::{Error, FieldError, Result};

/// Hex-encoded SHA-256 digest of resolved content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint raw bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bytes to upload together with their fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub bytes: Vec<u8>,
    pub fingerprint: Fingerprint,
}

/// Resolve a content source into raw bytes and a fingerprint.
///
/// # Errors
///
/// Returns a configuration error naming the field when the source is empty
/// or when base64 content does not decode.
pub fn resolve(source: &ContentSource) -> Result<ResolvedContent> {
    let bytes = decode(source).map_err(|problem| Error::Configuration {
        problems: vec![problem],
    })?;
    let fingerprint = Fingerprint::of(&bytes);
    Ok(ResolvedContent { bytes, fingerprint })
}

pub(crate) fn decode(source: &ContentSource) -> std::result::Result<Vec<u8>, FieldError> {
    match source {
        ContentSource::PlainText(text) => {
            if text.is_empty() {
                return Err(FieldError::new(CONTENT_FIELD, "must not be empty"));
            }
            Ok(text.as_bytes().to_vec())
        }
        ContentSource::Base64(encoded) => {
            if encoded.is_empty() {
                return Err(FieldError::new(CONTENT_BASE64_FIELD, "must not be empty"));
            }
            // Line breaks from wrapped encoders are skipped
            let unwrapped: String = encoded
                .chars()
                .filter(|c| !matches!(c, '\r' | '\n'))
                .collect();
            let bytes = STANDARD.decode(unwrapped.trim()).map_err(|e| {
                FieldError::new(
                    CONTENT_BASE64_FIELD,
                    format!("expected base64-encoded content ({e})"),
                )
            })?;
            if bytes.is_empty() {
                return Err(FieldError::new(
                    CONTENT_BASE64_FIELD,
                    "decodes to empty content",
                ));
            }
            Ok(bytes)
        }
    }
}
