//! Remote representations of secure files and authorization references
//!
//! These mirror the backend's JSON shapes. Fields the backend may omit are
//! explicit `Option`s or defaulted collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource type used for secure files in authorization references
pub const SECURE_FILE_RESOURCE_TYPE: &str = "securefile";

/// Identity of the user that created or modified a secure file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
}

/// A secure file as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Backend-assigned identity; absent or nil means "no such file"
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<IdentityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
}

impl RemoteFile {
    /// The file's identity, treating a nil UUID as missing
    pub fn identity(&self) -> Option<Uuid> {
        self.id.filter(|id| !id.is_nil())
    }
}

/// Metadata pushed to an existing secure file.
///
/// The properties map is always sent whole; the backend replaces its copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureFilePatch {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

/// A per-project record saying whether a resource may be used by all pipelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationReference {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default)]
    pub authorized: bool,
}

impl AuthorizationReference {
    /// Reference for a secure file
    pub fn secure_file(id: Uuid, name: impl Into<String>, authorized: bool) -> Self {
        Self {
            resource_type: SECURE_FILE_RESOURCE_TYPE.to_string(),
            id: id.to_string(),
            name: name.into(),
            authorized,
        }
    }

    /// Whether this reference points at the given secure file
    pub fn refers_to(&self, id: Uuid) -> bool {
        self.resource_type
            .eq_ignore_ascii_case(SECURE_FILE_RESOURCE_TYPE)
            && Uuid::parse_str(&self.id).is_ok_and(|parsed| parsed == id)
    }
}

/// Find the reference for a secure file in an authorization list
pub fn find_authorization(
    references: &[AuthorizationReference],
    id: Uuid,
) -> Option<&AuthorizationReference> {
    references.iter().find(|reference| reference.refers_to(id))
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}
