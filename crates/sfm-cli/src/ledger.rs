//! State ledger
//!
//! Records the [`ResourceState`] of every applied manifest, keyed by label,
//! so the next `apply` can plan against it. Persisted as TOML:
//!
//! ```toml
//! version = "1.0"
//!
//! [resources.signing]
//! id = "0f4b1c2d-7e8f-4a5b-8c9d-1e2f3a4b5c6d"
//! project_id = "6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d"
//! name = "signing.pfx"
//! fingerprint = "a591a6d4..."
//! allow_access = true
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sfm_model::ResourceState;

use crate::error::{CliError, Result};

const LEDGER_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Ledger format version for forward compatibility
    version: String,
    #[serde(default)]
    resources: BTreeMap<String, ResourceState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            resources: BTreeMap::new(),
        }
    }

    /// Load the ledger under a shared lock, or an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(CliError::ledger(path, e.to_string())),
        };
        file.lock_shared()
            .map_err(|e| CliError::ledger(path, format!("failed to lock: {e}")))?;

        // Read through the locked handle
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| CliError::ledger(path, e.to_string()))?;

        toml::from_str(&content).map_err(|e| CliError::ledger(path, e.to_string()))
    }

    /// Save atomically: exclusive lock, write to a temp file, rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::ledger(path, e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file
            .lock_exclusive()
            .map_err(|e| CliError::ledger(path, format!("failed to lock: {e}")))?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&ResourceState> {
        self.resources.get(label)
    }

    pub fn insert(&mut self, label: impl Into<String>, state: ResourceState) {
        self.resources.insert(label.into(), state);
    }

    pub fn remove(&mut self, label: &str) -> Option<ResourceState> {
        self.resources.remove(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sfm_model::Fingerprint;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn state() -> ResourceState {
        ResourceState {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            name: "cert.pfx".into(),
            fingerprint: Fingerprint::of(b"Hello World"),
            allow_access: true,
            properties: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::load(&dir.path().join("state.toml")).unwrap();
        assert_eq!(ledger, Ledger::new());
    }

    #[test]
    fn save_creates_parent_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".sfm").join("state.toml");

        let mut ledger = Ledger::new();
        ledger.insert("signing", state());
        ledger.save(&path).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Ledger::load(&path).unwrap();
        assert_eq!(loaded, ledger);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("version = \"1.0\""));
        assert!(raw.contains("[resources.signing]"));
    }

    #[test]
    fn remove_returns_recorded_state() {
        let mut ledger = Ledger::new();
        let recorded = state();
        ledger.insert("signing", recorded.clone());

        assert_eq!(ledger.labels().collect::<Vec<_>>(), vec!["signing"]);
        assert_eq!(ledger.remove("signing"), Some(recorded));
        assert!(ledger.get("signing").is_none());
    }

    #[test]
    fn corrupt_file_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "not = [valid").unwrap();

        let err = Ledger::load(&path).unwrap_err();
        assert!(err.to_string().contains("state.toml"));
    }
}
