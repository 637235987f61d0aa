//! TOML manifest declaring a secure file
//!
//! ```toml
//! project_id = "6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d"
//! name = "signing.pfx"
//! content_base64 = "MIIKcQIBAzCCCjcGCSqGSIb3DQEHAaCC..."
//! allow_access = true
//!
//! [properties]
//! owner = "release-team"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::desired::{
    ContentSource, DesiredState, NAME_BLANK_MESSAGE, NAME_FIELD, PROJECT_ID_FIELD,
};
use crate::error::{Error, FieldError, Result};

/// Raw manifest as written by the operator, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_base64: Option<String>,
    #[serde(default)]
    pub allow_access: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a manifest from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Convert into a validated [`DesiredState`], reporting every problem found.
    pub fn into_desired(self) -> Result<DesiredState> {
        let mut problems = Vec::new();

        let project_id = match Uuid::parse_str(self.project_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                problems.push(FieldError::new(
                    PROJECT_ID_FIELD,
                    format!("expected a UUID, got {:?}", self.project_id),
                ));
                None
            }
        };

        let content = match ContentSource::from_fields(
            self.content.as_deref(),
            self.content_base64.as_deref(),
        ) {
            Ok(source) => Some(source),
            Err(problem) => {
                problems.push(problem);
                None
            }
        };

        if self.name.trim().is_empty() {
            problems.push(FieldError::new(NAME_FIELD, NAME_BLANK_MESSAGE));
        }

        let (Some(project_id), Some(content)) = (project_id, content) else {
            return Err(Error::Configuration { problems });
        };

        let desired = DesiredState {
            project_id,
            name: self.name,
            content,
            allow_access: self.allow_access,
            properties: self.properties,
        };

        if let Err(Error::Configuration { problems: more }) = desired.validate() {
            for problem in more {
                if !problems.contains(&problem) {
                    problems.push(problem);
                }
            }
        }

        if problems.is_empty() {
            Ok(desired)
        } else {
            Err(Error::Configuration { problems })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desired::CONTENT_FIELD;
    use pretty_assertions::assert_eq;

    const PROJECT: &str = "6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d";

    #[test]
    fn parse_full_manifest() {
        let manifest = Manifest::parse(&format!(
            r#"
project_id = "{PROJECT}"
name = "signing.pfx"
content_base64 = "aGVsbG8="
allow_access = true

[properties]
owner = "release-team"
"#
        ))
        .unwrap();

        let desired = manifest.into_desired().unwrap();
        assert_eq!(desired.name, "signing.pfx");
        assert_eq!(desired.content, ContentSource::Base64("aGVsbG8=".into()));
        assert!(desired.allow_access);
        assert_eq!(desired.properties.len(), 1);
    }

    #[test]
    fn allow_access_defaults_to_false() {
        let manifest = Manifest {
            project_id: PROJECT.into(),
            name: "a.txt".into(),
            content: Some("Hello World".into()),
            ..Manifest::default()
        };
        assert!(!manifest.into_desired().unwrap().allow_access);
    }

    #[test]
    fn into_desired_reports_shape_problems_together() {
        let manifest = Manifest {
            project_id: "not-a-uuid".into(),
            name: "".into(),
            ..Manifest::default()
        };

        let err = manifest.into_desired().unwrap_err();
        let fields: Vec<&str> = err.problems().iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, vec![PROJECT_ID_FIELD, CONTENT_FIELD, NAME_FIELD]);
    }

    #[test]
    fn into_desired_rejects_blank_name() {
        let manifest = Manifest {
            project_id: PROJECT.into(),
            name: " ".into(),
            content: Some("x".into()),
            ..Manifest::default()
        };

        let err = manifest.into_desired().unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert_eq!(err.problems()[0].field, NAME_FIELD);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Manifest::parse(&format!(
            "project_id = \"{PROJECT}\"\nname = \"a\"\ncontent = \"x\"\nallow = true\n"
        ));
        assert!(result.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
