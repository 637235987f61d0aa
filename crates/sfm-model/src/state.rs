//! Recorded state of a reconciled secure file
//!
//! Callers persist a [`ResourceState`] after each successful reconciliation.
//! It carries the content fingerprint in place of the content itself, so the
//! next reconciliation can tell whether the content drifted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub allow_access: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_toml() {
        let state = ResourceState {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            name: "cert.pfx".into(),
            fingerprint: Fingerprint::of(b"content"),
            allow_access: true,
            properties: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        };

        let text = toml::to_string_pretty(&state).unwrap();
        assert!(text.contains("fingerprint = \""));
        let parsed: ResourceState = toml::from_str(&text).unwrap();
        assert_eq!(parsed, state);
    }
}
