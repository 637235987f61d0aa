//! Desired-state and manifest fixtures.
//!
//! [`Workspace`] mirrors how the `sfm` CLI is used: a temporary directory
//! holding one or more manifests and, once applied, a `.sfm/state.toml`
//! ledger.

use std::fs;
use std::path::{Path, PathBuf};

use sfm_model::{ContentSource, DesiredState};
use tempfile::TempDir;
use uuid::Uuid;

/// Project used by most scenarios
pub const PROJECT_ID: &str = "6a5c8d12-3f4e-4b2a-9c1d-0e7f8a9b0c1d";

/// A second project, for moves between projects
pub const OTHER_PROJECT_ID: &str = "b1e2d3c4-a5f6-4789-8abc-def012345678";

/// `"Hello World"` fingerprint
pub const HELLO_WORLD_SHA256: &str =
    "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e";

pub fn project_id() -> Uuid {
    Uuid::parse_str(PROJECT_ID).expect("PROJECT_ID is a valid UUID")
}

pub fn other_project_id() -> Uuid {
    Uuid::parse_str(OTHER_PROJECT_ID).expect("OTHER_PROJECT_ID is a valid UUID")
}

/// `cert.pfx` holding `"Hello World"` in [`PROJECT_ID`], no access, no properties
pub fn hello_world() -> DesiredState {
    DesiredState::new(
        project_id(),
        "cert.pfx",
        ContentSource::PlainText("Hello World".to_string()),
    )
}

/// A temporary working directory for CLI scenarios.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Workspace::new: failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` to `name` under the root and return its path.
    pub fn write_manifest(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, contents).expect("Workspace::write_manifest: failed to write");
        path
    }

    /// Write the manifest equivalent of [`hello_world`].
    pub fn write_hello_world(&self, name: &str) -> PathBuf {
        self.write_manifest(
            name,
            &format!("project_id = \"{PROJECT_ID}\"\nname = \"cert.pfx\"\ncontent = \"Hello World\"\n"),
        )
    }

    /// Default ledger location.
    pub fn state_path(&self) -> PathBuf {
        self.root().join(".sfm").join("state.toml")
    }

    pub fn read_state(&self) -> Option<String> {
        fs::read_to_string(self.state_path()).ok()
    }
}
