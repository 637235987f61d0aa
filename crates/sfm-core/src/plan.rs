//! Planning a reconciliation from recorded state
//!
//! Content is immutable once uploaded, so a changed fingerprint (or a move
//! to another project) can only be reconciled by replacing the file.

use std::fmt;

use sfm_model::{DesiredState, Fingerprint, ResourceState};
use uuid::Uuid;

use crate::Result;

/// Why an existing secure file must be destroyed and recreated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceReason {
    ProjectChanged { from: Uuid, to: Uuid },
    ContentChanged { from: Fingerprint, to: Fingerprint },
}

impl fmt::Display for ReplaceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectChanged { from, to } => write!(f, "project changed ({from} -> {to})"),
            Self::ContentChanged { from, to } => write!(f, "content changed ({from} -> {to})"),
        }
    }
}

/// An in-place change to an existing secure file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Name { from: String, to: String },
    Properties,
    AllowAccess { from: bool, to: bool },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name { from, to } => write!(f, "name {from:?} -> {to:?}"),
            Self::Properties => f.write_str("properties"),
            Self::AllowAccess { from, to } => write!(f, "allow_access {from} -> {to}"),
        }
    }
}

/// What a reconciliation needs to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Create,
    Replace { reasons: Vec<ReplaceReason> },
    Update { changes: Vec<Change> },
    Noop,
}

impl Plan {
    /// Short verb for reports
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Replace { .. } => "replace",
            Self::Update { .. } => "update",
            Self::Noop => "no changes",
        }
    }
}

/// Compare recorded state with the desired state.
///
/// # Errors
///
/// Returns a configuration error if the desired state is invalid.
pub fn plan(prior: Option<&ResourceState>, desired: &DesiredState) -> Result<Plan> {
    desired.validate()?;
    let fingerprint = desired.fingerprint()?;

    let Some(prior) = prior else {
        return Ok(Plan::Create);
    };

    let mut reasons = Vec::new();
    if prior.project_id != desired.project_id {
        reasons.push(ReplaceReason::ProjectChanged {
            from: prior.project_id,
            to: desired.project_id,
        });
    }
    if prior.fingerprint != fingerprint {
        reasons.push(ReplaceReason::ContentChanged {
            from: prior.fingerprint.clone(),
            to: fingerprint,
        });
    }
    if !reasons.is_empty() {
        return Ok(Plan::Replace { reasons });
    }

    let mut changes = Vec::new();
    if prior.name != desired.name {
        changes.push(Change::Name {
            from: prior.name.clone(),
            to: desired.name.clone(),
        });
    }
    if prior.properties != desired.properties {
        changes.push(Change::Properties);
    }
    if prior.allow_access != desired.allow_access {
        changes.push(Change::AllowAccess {
            from: prior.allow_access,
            to: desired.allow_access,
        });
    }

    if changes.is_empty() {
        Ok(Plan::Noop)
    } else {
        Ok(Plan::Update { changes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sfm_model::ContentSource;

    fn desired() -> DesiredState {
        DesiredState::new(
            Uuid::parse_str("6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d").unwrap(),
            "cert.pfx",
            ContentSource::PlainText("Hello World".into()),
        )
    }

    fn recorded(desired: &DesiredState) -> ResourceState {
        ResourceState {
            id: Uuid::new_v4(),
            project_id: desired.project_id,
            name: desired.name.clone(),
            fingerprint: desired.fingerprint().unwrap(),
            allow_access: desired.allow_access,
            properties: desired.properties.clone(),
        }
    }

    #[test]
    fn nothing_recorded_means_create() {
        assert_eq!(plan(None, &desired()).unwrap(), Plan::Create);
    }

    #[test]
    fn identical_state_is_noop() {
        let desired = desired();
        assert_eq!(plan(Some(&recorded(&desired)), &desired).unwrap(), Plan::Noop);
    }

    #[test]
    fn content_drift_forces_replace() {
        let desired = desired();
        let prior = recorded(&desired);
        let changed = DesiredState {
            content: ContentSource::PlainText("Hello Moon".into()),
            ..desired
        };

        let result = plan(Some(&prior), &changed).unwrap();
        assert!(matches!(
            result,
            Plan::Replace { ref reasons } if matches!(reasons[0], ReplaceReason::ContentChanged { .. })
        ));
    }

    #[test]
    fn same_bytes_through_base64_is_not_drift() {
        let desired = desired();
        let prior = recorded(&desired);
        let encoded = DesiredState {
            content: ContentSource::Base64("SGVsbG8gV29ybGQ=".into()),
            ..desired
        };
        assert_eq!(plan(Some(&prior), &encoded).unwrap(), Plan::Noop);
    }

    #[test]
    fn project_move_forces_replace() {
        let desired = desired();
        let mut prior = recorded(&desired);
        prior.project_id = Uuid::new_v4();

        assert_eq!(plan(Some(&prior), &desired).unwrap().verb(), "replace");
    }

    #[test]
    fn metadata_changes_are_updates() {
        let desired = desired();
        let prior = recorded(&desired);
        let changed = desired
            .with_name("renamed.pfx")
            .with_property("env", "prod")
            .with_allow_access(true);

        assert_eq!(
            plan(Some(&prior), &changed).unwrap(),
            Plan::Update {
                changes: vec![
                    Change::Name {
                        from: "cert.pfx".into(),
                        to: "renamed.pfx".into()
                    },
                    Change::Properties,
                    Change::AllowAccess {
                        from: false,
                        to: true
                    },
                ]
            }
        );
    }

    #[test]
    fn invalid_desired_state_is_rejected() {
        let invalid = desired().with_name(" ");
        assert!(matches!(
            plan(None, &invalid),
            Err(crate::Error::Configuration(_))
        ));
    }
}
