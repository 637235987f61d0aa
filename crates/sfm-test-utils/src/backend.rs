//! In-memory backend for engine tests
//!
//! [`FakeBackend`] implements both [`SecureFileStore`] and
//! [`AuthorizationStore`]. Clones share state, so a test can hand one clone
//! to the engine and inspect another.
//!
//! Behaviour mirrors the real service where the engine depends on it:
//!
//! - upload ignores everything but the name; properties start empty
//! - update replaces name and the whole properties map
//! - deauthorizing removes the reference; listing only returns authorized ones
//! - a removed project answers every call with `400 VS800075`
//!
//! Every call is logged before faults are applied, so call-order assertions
//! see attempted calls as well as successful ones.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use sfm_core::{
    AuthorizationFilter, AuthorizationStore, GetOptions, SecureFileStore, StoreError,
    StoreResult, UploadRequest, require_non_empty,
};
use sfm_model::{AuthorizationReference, RemoteFile, SecureFilePatch};
use uuid::Uuid;

/// Kind of store call, used for fault injection and order assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Upload,
    Get,
    Update,
    Delete,
    List,
    Patch,
}

/// A recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload {
        project: String,
        name: String,
        bytes: Vec<u8>,
    },
    Get {
        project: String,
        id: Uuid,
    },
    Update {
        project: String,
        id: Uuid,
        patch: SecureFilePatch,
    },
    Delete {
        project: String,
        id: Uuid,
    },
    List {
        project: String,
        filter: AuthorizationFilter,
    },
    Patch {
        project: String,
        references: Vec<AuthorizationReference>,
    },
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::Upload { .. } => CallKind::Upload,
            Self::Get { .. } => CallKind::Get,
            Self::Update { .. } => CallKind::Update,
            Self::Delete { .. } => CallKind::Delete,
            Self::List { .. } => CallKind::List,
            Self::Patch { .. } => CallKind::Patch,
        }
    }
}

enum Fault {
    Once(StoreError),
    Always(StoreError),
    Hang,
}

#[derive(Default)]
struct State {
    files: HashMap<(String, Uuid), RemoteFile>,
    contents: HashMap<Uuid, Vec<u8>>,
    authorizations: HashMap<String, Vec<AuthorizationReference>>,
    removed_projects: HashSet<String>,
    faults: HashMap<CallKind, Fault>,
    calls: Vec<Call>,
    return_nil_ids: bool,
}

/// In-memory backend shared between clones
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake backend state poisoned")
    }

    /// Boxed clones ready to hand to `ReconciliationEngine::new`
    pub fn stores(&self) -> (Box<dyn SecureFileStore>, Box<dyn AuthorizationStore>) {
        (Box::new(self.clone()), Box::new(self.clone()))
    }

    /// Fail the next call of `kind` with `err`
    pub fn fail_next(&self, kind: CallKind, err: StoreError) {
        self.lock().faults.insert(kind, Fault::Once(err));
    }

    /// Fail every call of `kind` with `err`
    pub fn fail_always(&self, kind: CallKind, err: StoreError) {
        self.lock().faults.insert(kind, Fault::Always(err));
    }

    /// Never answer calls of `kind`
    pub fn hang(&self, kind: CallKind) {
        self.lock().faults.insert(kind, Fault::Hang);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    /// Simulate the project being deleted out from under us
    pub fn remove_project(&self, project: &str) {
        let mut state = self.lock();
        state.removed_projects.insert(project.to_string());
        state.files.retain(|(p, _), _| p != project);
        state.authorizations.remove(project);
    }

    /// Answer `get` with a nil identity for files that exist
    pub fn return_nil_ids(&self, enabled: bool) {
        self.lock().return_nil_ids = enabled;
    }

    /// Seed an existing secure file directly
    pub fn insert_file(
        &self,
        project: &str,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().files.insert(
            (project.to_string(), id),
            RemoteFile {
                id: Some(id),
                name: name.to_string(),
                properties,
                ..RemoteFile::default()
            },
        );
        id
    }

    /// Seed an authorization reference directly
    pub fn insert_authorization(&self, project: &str, reference: AuthorizationReference) {
        self.lock()
            .authorizations
            .entry(project.to_string())
            .or_default()
            .push(reference);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_kinds(&self) -> Vec<CallKind> {
        self.lock().calls.iter().map(Call::kind).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn file(&self, project: &str, id: Uuid) -> Option<RemoteFile> {
        self.lock().files.get(&(project.to_string(), id)).cloned()
    }

    pub fn content(&self, id: Uuid) -> Option<Vec<u8>> {
        self.lock().contents.get(&id).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    /// Stored authorization for a file, if any
    pub fn authorization(&self, project: &str, id: Uuid) -> Option<AuthorizationReference> {
        self.lock()
            .authorizations
            .get(project)
            .and_then(|refs| refs.iter().find(|r| r.refers_to(id)).cloned())
    }

    /// Log the call and apply any fault. Returns `true` if the call must hang.
    fn begin(&self, call: Call) -> StoreResult<bool> {
        let kind = call.kind();
        let project = match &call {
            Call::Upload { project, .. }
            | Call::Get { project, .. }
            | Call::Update { project, .. }
            | Call::Delete { project, .. }
            | Call::List { project, .. }
            | Call::Patch { project, .. } => project.clone(),
        };

        let mut state = self.lock();
        state.calls.push(call);

        match state.faults.remove(&kind) {
            Some(Fault::Once(err)) => return Err(err),
            Some(Fault::Always(err)) => {
                state.faults.insert(kind, Fault::Always(err.clone()));
                return Err(err);
            }
            Some(Fault::Hang) => {
                state.faults.insert(kind, Fault::Hang);
                return Ok(true);
            }
            None => {}
        }

        if state.removed_projects.contains(&project) {
            return Err(StoreError::api(
                400,
                format!(
                    "VS800075: The project with id '{project}' does not exist, or you do not have permission to access it."
                ),
            ));
        }
        Ok(false)
    }

    async fn enter(&self, call: Call) -> StoreResult<()> {
        if self.begin(call)? {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> StoreError {
    StoreError::api(404, format!("Secure file {id} does not exist."))
}

#[async_trait]
impl SecureFileStore for FakeBackend {
    async fn upload(&self, request: UploadRequest) -> StoreResult<RemoteFile> {
        require_non_empty("args.Name", &request.name)?;
        require_non_empty("args.Project", &request.project)?;
        if request.content.is_empty() {
            return Err(StoreError::missing("args.Content"));
        }

        self.enter(Call::Upload {
            project: request.project.clone(),
            name: request.name.clone(),
            bytes: request.content.clone(),
        })
        .await?;

        let id = Uuid::new_v4();
        let file = RemoteFile {
            id: Some(id),
            name: request.name,
            ..RemoteFile::default()
        };

        let mut state = self.lock();
        state.contents.insert(id, request.content);
        state.files.insert((request.project, id), file.clone());
        Ok(file)
    }

    async fn get(
        &self,
        project: &str,
        file_id: Uuid,
        _options: GetOptions,
    ) -> StoreResult<RemoteFile> {
        require_non_empty("args.Project", project)?;
        self.enter(Call::Get {
            project: project.to_string(),
            id: file_id,
        })
        .await?;

        let state = self.lock();
        let mut file = state
            .files
            .get(&(project.to_string(), file_id))
            .cloned()
            .ok_or_else(|| not_found(file_id))?;
        if state.return_nil_ids {
            file.id = Some(Uuid::nil());
        }
        Ok(file)
    }

    async fn update(
        &self,
        project: &str,
        file_id: Uuid,
        patch: &SecureFilePatch,
    ) -> StoreResult<RemoteFile> {
        require_non_empty("args.Project", project)?;
        self.enter(Call::Update {
            project: project.to_string(),
            id: file_id,
            patch: patch.clone(),
        })
        .await?;

        let mut state = self.lock();
        let file = state
            .files
            .get_mut(&(project.to_string(), file_id))
            .ok_or_else(|| not_found(file_id))?;
        file.name = patch.name.clone();
        file.properties = patch.properties.clone();
        Ok(file.clone())
    }

    async fn delete(&self, project: &str, file_id: Uuid) -> StoreResult<()> {
        require_non_empty("args.Project", project)?;
        self.enter(Call::Delete {
            project: project.to_string(),
            id: file_id,
        })
        .await?;

        let mut state = self.lock();
        state
            .files
            .remove(&(project.to_string(), file_id))
            .ok_or_else(|| not_found(file_id))?;
        state.contents.remove(&file_id);
        Ok(())
    }
}

#[async_trait]
impl AuthorizationStore for FakeBackend {
    async fn list(
        &self,
        project: &str,
        filter: &AuthorizationFilter,
    ) -> StoreResult<Vec<AuthorizationReference>> {
        require_non_empty("args.Project", project)?;
        self.enter(Call::List {
            project: project.to_string(),
            filter: filter.clone(),
        })
        .await?;

        let state = self.lock();
        let references = state
            .authorizations
            .get(project)
            .map(|refs| {
                refs.iter()
                    .filter(|r| {
                        filter
                            .resource_type
                            .as_deref()
                            .is_none_or(|t| r.resource_type.eq_ignore_ascii_case(t))
                            && filter.id.as_deref().is_none_or(|id| r.id == id)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(references)
    }

    async fn patch(
        &self,
        project: &str,
        references: &[AuthorizationReference],
    ) -> StoreResult<Vec<AuthorizationReference>> {
        require_non_empty("args.Project", project)?;
        self.enter(Call::Patch {
            project: project.to_string(),
            references: references.to_vec(),
        })
        .await?;

        let mut state = self.lock();
        let stored = state.authorizations.entry(project.to_string()).or_default();
        for reference in references {
            stored.retain(|r| {
                r.id != reference.id
                    || !r.resource_type.eq_ignore_ascii_case(&reference.resource_type)
            });
            if reference.authorized {
                stored.push(reference.clone());
            }
        }
        Ok(references.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_get_round_trips_name() {
        let backend = FakeBackend::new();
        let file = backend
            .upload(UploadRequest {
                project: "p".into(),
                name: "a.txt".into(),
                content: b"x".to_vec(),
                authorize_pipelines: None,
            })
            .await
            .unwrap();

        let id = file.identity().unwrap();
        let fetched = backend.get("p", id, GetOptions::default()).await.unwrap();
        assert_eq!(fetched.name, "a.txt");
        assert_eq!(backend.call_kinds(), vec![CallKind::Upload, CallKind::Get]);
    }

    #[tokio::test]
    async fn removed_project_answers_vs800075() {
        let backend = FakeBackend::new();
        let id = backend.insert_file("p", "a.txt", BTreeMap::new());
        backend.remove_project("p");

        let err = backend.get("p", id, GetOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Api(ref api) if api.status == 400 && api.message.contains("VS800075")
        ));
    }

    #[tokio::test]
    async fn one_shot_fault_clears_after_use() {
        let backend = FakeBackend::new();
        backend.fail_next(CallKind::List, StoreError::api(500, "boom"));

        let filter = AuthorizationFilter::default();
        assert!(backend.list("p", &filter).await.is_err());
        assert!(backend.list("p", &filter).await.is_ok());
    }
}
