//! Desired state of a single secure file
//!
//! A [`DesiredState`] is what the operator declares. It is checked once, at
//! the boundary, by [`DesiredState::validate`]; the engine never sees an
//! unchecked value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{self, Fingerprint, ResolvedContent};
use crate::error::{Error, FieldError, Result};
use crate::format::humanise_list;

pub const PROJECT_ID_FIELD: &str = "project_id";
pub const NAME_FIELD: &str = "name";
pub const CONTENT_FIELD: &str = "content";
pub const CONTENT_BASE64_FIELD: &str = "content_base64";

pub(crate) const NAME_BLANK_MESSAGE: &str = "must not be empty or whitespace";

/// Where the secure file's bytes come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ContentSource {
    /// Text uploaded as its UTF-8 bytes
    PlainText(String),
    /// Standard base64, used for binary content
    Base64(String),
}

impl ContentSource {
    /// Pick the content source from two mutually exclusive optional fields.
    ///
    /// Empty strings count as unset.
    pub fn from_fields(
        content: Option<&str>,
        content_base64: Option<&str>,
    ) -> std::result::Result<Self, FieldError> {
        let content = content.filter(|s| !s.is_empty());
        let content_base64 = content_base64.filter(|s| !s.is_empty());

        match (content, content_base64) {
            (Some(text), None) => Ok(Self::PlainText(text.to_string())),
            (None, Some(encoded)) => Ok(Self::Base64(encoded.to_string())),
            (Some(_), Some(_)) => Err(FieldError::new(
                CONTENT_FIELD,
                format!(
                    "conflicts with {}; set exactly one",
                    humanise_list(&[CONTENT_BASE64_FIELD])
                ),
            )),
            (None, None) => Err(FieldError::new(
                CONTENT_FIELD,
                format!(
                    "one of {} must be set",
                    humanise_list(&[CONTENT_FIELD, CONTENT_BASE64_FIELD])
                ),
            )),
        }
    }
}

/// Declared state of one secure file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    pub project_id: Uuid,
    pub name: String,
    pub content: ContentSource,
    #[serde(default)]
    pub allow_access: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DesiredState {
    /// Create a desired state with pipeline access disabled and no properties
    pub fn new(project_id: Uuid, name: impl Into<String>, content: ContentSource) -> Self {
        Self {
            project_id,
            name: name.into(),
            content,
            allow_access: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_allow_access(mut self, allow_access: bool) -> Self {
        self.allow_access = allow_access;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check every invariant, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] listing each offending field.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.project_id.is_nil() {
            problems.push(FieldError::new(PROJECT_ID_FIELD, "must not be the nil UUID"));
        }
        if self.name.trim().is_empty() {
            problems.push(FieldError::new(NAME_FIELD, NAME_BLANK_MESSAGE));
        }
        if let Err(problem) = content::decode(&self.content) {
            problems.push(problem);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration { problems })
        }
    }

    /// Validate and resolve the content in one step
    pub fn resolve_content(&self) -> Result<ResolvedContent> {
        self.validate()?;
        content::resolve(&self.content)
    }

    /// Fingerprint of the declared content
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        content::resolve(&self.content).map(|resolved| resolved.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> Uuid {
        Uuid::parse_str("6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d").unwrap()
    }

    #[test]
    fn from_fields_prefers_the_single_set_field() {
        assert_eq!(
            ContentSource::from_fields(Some("abc"), None).unwrap(),
            ContentSource::PlainText("abc".into())
        );
        assert_eq!(
            ContentSource::from_fields(Some(""), Some("YWJj")).unwrap(),
            ContentSource::Base64("YWJj".into())
        );
    }

    #[test]
    fn from_fields_rejects_both() {
        let err = ContentSource::from_fields(Some("abc"), Some("YWJj")).unwrap_err();
        assert_eq!(err.field, CONTENT_FIELD);
        assert!(err.message.contains("conflicts with content_base64"));
    }

    #[test]
    fn from_fields_rejects_neither() {
        let err = ContentSource::from_fields(None, Some("")).unwrap_err();
        assert!(err.message.contains("content & content_base64"));
    }

    #[test]
    fn validate_collects_all_problems() {
        let desired = DesiredState::new(
            Uuid::nil(),
            "   ",
            ContentSource::Base64("%%%".into()),
        );

        let err = desired.validate().unwrap_err();
        let fields: Vec<&str> = err.problems().iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, vec![PROJECT_ID_FIELD, NAME_FIELD, CONTENT_BASE64_FIELD]);
    }

    #[test]
    fn validate_accepts_well_formed_state() {
        let desired = DesiredState::new(project(), "cert.pfx", ContentSource::PlainText("x".into()))
            .with_allow_access(true)
            .with_property("env", "prod");
        assert!(desired.validate().is_ok());
        assert_eq!(desired.properties.get("env").map(String::as_str), Some("prod"));
    }
}
