//! ReconciliationEngine implementation
//!
//! The engine converges one secure file and its authorization reference onto
//! a [`DesiredState`]. Each operation issues its remote calls sequentially in
//! a fixed order:
//!
//! | operation | calls |
//! |-----------|-------|
//! | create    | upload, update metadata, patch authorization |
//! | read      | get, list authorizations |
//! | update    | update metadata, patch authorization |
//! | delete    | patch authorization (deauthorize), delete |
//!
//! No step is retried and nothing is rolled back. A failure part way through
//! leaves a state that a later read, update or delete converges from.

use std::future::Future;

use serde::Serialize;
use sfm_model::{
    AuthorizationReference, DesiredState, Fingerprint, RemoteFile, ResourceState,
    SecureFilePatch, find_authorization,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{ErrorKind, classify};
use crate::context::CallContext;
use crate::error::{Error, Operation, Result, Target};
use crate::plan::{Plan, plan};
use crate::store::{
    AuthorizationFilter, AuthorizationStore, GetOptions, SecureFileStore, StoreResult,
    UploadRequest,
};

/// Observed remote state of a secure file and its authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observed {
    pub project_id: Uuid,
    pub id: Uuid,
    pub file: RemoteFile,
    /// The matching reference, or an unauthorized placeholder when none exists
    pub authorization: AuthorizationReference,
}

impl Observed {
    fn merge(
        project_id: Uuid,
        id: Uuid,
        file: RemoteFile,
        references: &[AuthorizationReference],
    ) -> Self {
        let authorization = find_authorization(references, id)
            .cloned()
            .unwrap_or_else(|| AuthorizationReference::secure_file(id, file.name.clone(), false));
        Self {
            project_id,
            id,
            file,
            authorization,
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn allow_access(&self) -> bool {
        self.authorization.authorized
    }

    /// Whether name, properties and pipeline access already match `desired`
    pub fn matches(&self, desired: &DesiredState) -> bool {
        self.project_id == desired.project_id
            && self.file.name == desired.name
            && self.file.properties == desired.properties
            && self.allow_access() == desired.allow_access
    }

    /// Record this observation together with the content fingerprint
    pub fn to_state(&self, fingerprint: Fingerprint) -> ResourceState {
        ResourceState {
            id: self.id,
            project_id: self.project_id,
            name: self.file.name.clone(),
            fingerprint,
            allow_access: self.allow_access(),
            properties: self.file.properties.clone(),
        }
    }
}

/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub observed: Observed,
    pub fingerprint: Fingerprint,
}

/// Result of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(Observed),
    /// The identity no longer refers to any remote secure file
    Absent,
}

impl ReadOutcome {
    pub fn present(self) -> Option<Observed> {
        match self {
            Self::Present(observed) => Some(observed),
            Self::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Report from [`ReconciliationEngine::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// What the recorded state called for
    pub plan: Plan,
    /// Actions actually taken, in order
    pub actions: Vec<String>,
    /// State to record for the next reconciliation
    pub state: ResourceState,
    pub observed: Observed,
}

/// Engine for reconciling secure files
///
/// Holds its two stores for its whole life; there is no shared or global
/// client.
pub struct ReconciliationEngine {
    files: Box<dyn SecureFileStore>,
    authorizations: Box<dyn AuthorizationStore>,
    context: CallContext,
}

impl ReconciliationEngine {
    /// Create an engine over the given stores
    pub fn new(
        files: Box<dyn SecureFileStore>,
        authorizations: Box<dyn AuthorizationStore>,
    ) -> Self {
        Self {
            files,
            authorizations,
            context: CallContext::new(),
        }
    }

    /// Use `context` for cancellation and deadlines of every remote call
    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    /// Create the secure file and its authorization.
    ///
    /// The upload is not trusted to set metadata, so name and properties are
    /// pushed again right after it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any remote call if `desired` is
    /// invalid. A failure after the upload leaves the new file in place.
    pub async fn create(&self, desired: &DesiredState) -> Result<Created> {
        let resolved = desired.resolve_content()?;
        let project = desired.project_id;
        let project_arg = project.to_string();

        debug!(
            project = %project,
            name = %desired.name,
            bytes = resolved.bytes.len(),
            "Uploading secure file"
        );
        let uploaded = self
            .call(
                Operation::Upload,
                Target::project(project),
                self.files.upload(UploadRequest {
                    project: project_arg.clone(),
                    name: desired.name.clone(),
                    content: resolved.bytes,
                    authorize_pipelines: None,
                }),
            )
            .await?;

        let Some(id) = uploaded.identity() else {
            return Err(Error::UnexpectedResponse {
                operation: Operation::Upload,
                target: Target::project(project),
                message: "backend returned a secure file without an id".to_string(),
            });
        };
        debug!(project = %project, id = %id, "Uploaded secure file");

        let file = self.push_metadata(project, id, desired).await?;
        let references = self.authorize(project, id, &file, desired.allow_access).await?;
        let observed = Observed::merge(project, id, file, &references);

        info!(
            project = %project,
            id = %id,
            fingerprint = %resolved.fingerprint,
            allow_access = observed.allow_access(),
            "Created secure file"
        );
        Ok(Created {
            observed,
            fingerprint: resolved.fingerprint,
        })
    }

    /// Read the secure file and its authorization.
    ///
    /// A missing file, or a missing parent project, is reported as
    /// [`ReadOutcome::Absent`] rather than an error.
    pub async fn read(&self, id: Uuid, project: Uuid) -> Result<ReadOutcome> {
        let project_arg = project.to_string();
        let target = Target::file(project, id);

        let fetched = self
            .context
            .run(self.files.get(&project_arg, id, GetOptions::default()))
            .await
            .map_err(|reason| Error::Interrupted {
                operation: Operation::Get,
                target,
                reason,
            })?;

        let file = match fetched {
            Ok(file) => file,
            Err(err) if classify(&err) == ErrorKind::NotFound => {
                warn!(project = %project, id = %id, error = %err, "Secure file is gone");
                return Ok(ReadOutcome::Absent);
            }
            Err(err) => return Err(Error::from_store(Operation::Get, target, err)),
        };

        if file.identity().is_none() {
            warn!(project = %project, id = %id, "Backend returned a secure file without an id");
            return Ok(ReadOutcome::Absent);
        }

        let references = self
            .call(
                Operation::ListAuthorizations,
                target,
                self.authorizations
                    .list(&project_arg, &AuthorizationFilter::secure_file(id)),
            )
            .await?;

        debug!(
            project = %project,
            id = %id,
            references = references.len(),
            "Read secure file"
        );
        Ok(ReadOutcome::Present(Observed::merge(
            project,
            id,
            file,
            &references,
        )))
    }

    /// Push name, properties and pipeline access to an existing secure file.
    ///
    /// Content is never touched. The authorization is written every time
    /// with the currently desired flag.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist; update needs an existing identity.
    pub async fn update(
        &self,
        id: Uuid,
        project: Uuid,
        desired: &DesiredState,
    ) -> Result<Observed> {
        desired.validate()?;

        let file = self.push_metadata(project, id, desired).await?;
        let references = self.authorize(project, id, &file, desired.allow_access).await?;
        let observed = Observed::merge(project, id, file, &references);

        info!(
            project = %project,
            id = %id,
            allow_access = observed.allow_access(),
            "Updated secure file"
        );
        Ok(observed)
    }

    /// Deauthorize, then delete the secure file.
    ///
    /// If the deauthorization fails the file is left alone.
    pub async fn delete(&self, id: Uuid, project: Uuid) -> Result<()> {
        let project_arg = project.to_string();
        let target = Target::file(project, id);

        debug!(project = %project, id = %id, "Deauthorizing secure file");
        self.call(
            Operation::Deauthorize,
            target,
            self.authorizations.patch(
                &project_arg,
                &[AuthorizationReference::secure_file(id, "", false)],
            ),
        )
        .await?;

        self.call(
            Operation::Delete,
            target,
            self.files.delete(&project_arg, id),
        )
        .await?;

        info!(project = %project, id = %id, "Deleted secure file");
        Ok(())
    }

    /// Converge onto `desired` starting from recorded state.
    ///
    /// Creates when nothing is recorded or the recorded file has vanished,
    /// replaces when content or project changed, and otherwise updates only
    /// if the remote state differs from `desired`.
    pub async fn apply(
        &self,
        prior: Option<&ResourceState>,
        desired: &DesiredState,
    ) -> Result<ApplyReport> {
        let plan = plan(prior, desired)?;
        let mut actions = Vec::new();

        let (observed, fingerprint) = match (&plan, prior) {
            (Plan::Create, _) | (_, None) => {
                let created = self.create(desired).await?;
                actions.push(format!("Created secure file {}", created.observed.id));
                (created.observed, created.fingerprint)
            }
            (Plan::Replace { reasons }, Some(prior)) => {
                for reason in reasons {
                    actions.push(format!("Replacing secure file {}: {}", prior.id, reason));
                }
                if self.read(prior.id, prior.project_id).await?.is_absent() {
                    actions.push(format!("Secure file {} already gone", prior.id));
                } else {
                    self.delete(prior.id, prior.project_id).await?;
                    actions.push(format!("Deleted secure file {}", prior.id));
                }
                let created = self.create(desired).await?;
                actions.push(format!("Created secure file {}", created.observed.id));
                (created.observed, created.fingerprint)
            }
            (Plan::Update { .. } | Plan::Noop, Some(prior)) => {
                match self.read(prior.id, prior.project_id).await? {
                    ReadOutcome::Absent => {
                        actions.push(format!("Secure file {} is gone, recreating", prior.id));
                        let created = self.create(desired).await?;
                        actions.push(format!("Created secure file {}", created.observed.id));
                        (created.observed, created.fingerprint)
                    }
                    ReadOutcome::Present(observed) if observed.matches(desired) => {
                        (observed, prior.fingerprint.clone())
                    }
                    ReadOutcome::Present(_) => {
                        let observed = self.update(prior.id, prior.project_id, desired).await?;
                        actions.push(format!("Updated secure file {}", prior.id));
                        (observed, prior.fingerprint.clone())
                    }
                }
            }
        };

        Ok(ApplyReport {
            plan,
            actions,
            state: observed.to_state(fingerprint),
            observed,
        })
    }

    async fn push_metadata(
        &self,
        project: Uuid,
        id: Uuid,
        desired: &DesiredState,
    ) -> Result<RemoteFile> {
        let patch = SecureFilePatch {
            name: desired.name.clone(),
            properties: desired.properties.clone(),
        };
        let project_arg = project.to_string();

        debug!(
            project = %project,
            id = %id,
            properties = patch.properties.len(),
            "Updating secure file metadata"
        );
        let file = self
            .call(
                Operation::UpdateMetadata,
                Target::file(project, id),
                self.files.update(&project_arg, id, &patch),
            )
            .await?;

        // Some backends answer a PATCH with an empty body; keep the identity we addressed.
        Ok(RemoteFile {
            id: Some(id),
            ..file
        })
    }

    async fn authorize(
        &self,
        project: Uuid,
        id: Uuid,
        file: &RemoteFile,
        allow_access: bool,
    ) -> Result<Vec<AuthorizationReference>> {
        let project_arg = project.to_string();
        let desired = [AuthorizationReference::secure_file(
            id,
            file.name.clone(),
            allow_access,
        )];

        debug!(project = %project, id = %id, allow_access, "Patching resource authorization");
        self.call(
            Operation::Authorize,
            Target::file(project, id),
            self.authorizations.patch(&project_arg, &desired),
        )
        .await
    }

    async fn call<T>(
        &self,
        operation: Operation,
        target: Target,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T> {
        match self.context.run(call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Error::from_store(operation, target, err)),
            Err(reason) => {
                warn!(%operation, %target, %reason, "Remote call interrupted");
                Err(Error::Interrupted {
                    operation,
                    target,
                    reason,
                })
            }
        }
    }
}
