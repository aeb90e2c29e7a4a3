//! Artifact service: create, update and serve project archives.
//!
//! The metadata store and the blob store share no transaction. Consistency
//! between them comes from step order and per-artifact leases:
//!
//! - create commits the record, then writes the blob, and deletes the record
//!   again if the blob write fails
//! - archive updates write the blob first and only then move the fingerprint,
//!   so a failed blob write leaves the old, matching pair in place
//! - every mutation of one artifact runs under that artifact's exclusive
//!   lease, and reads hold a shared lease from record load to verification
//!
//! Validation and authorization happen before any side effect.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::archive::{fingerprint, validate};
use crate::auth::guard;
use crate::auth::AuthenticatedCaller;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::service::lease::{ArtifactLease, ArtifactLocks};
use crate::store::{BlobStore, ProjectStore, UserDirectory};
use crate::types::{validate_project_name, Project, ProjectRecord, ProjectUpdate};

/// Tunables for the artifact service.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    /// Upper bound for a single blob read or write
    pub blob_timeout: Duration,
    /// Re-hash blobs on read and compare with the recorded fingerprint
    pub verify_on_read: bool,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            blob_timeout: Duration::from_secs(30),
            verify_on_read: true,
        }
    }
}

/// Archive bytes together with the record they belong to.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub record: ProjectRecord,
    pub bytes: Vec<u8>,
}

/// Orchestrates the project artifact use cases.
pub struct ArtifactService {
    projects: Arc<dyn ProjectStore>,
    blobs: Arc<dyn BlobStore>,
    users: Arc<dyn UserDirectory>,
    locks: ArtifactLocks,
    metrics: Arc<Metrics>,
    options: ArtifactOptions,
}

impl ArtifactService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        blobs: Arc<dyn BlobStore>,
        users: Arc<dyn UserDirectory>,
        metrics: Arc<Metrics>,
        options: ArtifactOptions,
    ) -> Self {
        Self {
            projects,
            blobs,
            users,
            locks: ArtifactLocks::new(),
            metrics,
            options,
        }
    }

    /// Upload a new project archive owned by the caller.
    pub async fn create(
        &self,
        name: &str,
        archive: &[u8],
        caller: AuthenticatedCaller,
    ) -> Result<ProjectRecord> {
        let name = validate_project_name(name)?;

        let creator = self
            .users
            .get_by_id(caller.user_id)
            .await?
            .ok_or_else(|| {
                warn!("User {} not found, cannot create a project", caller.user_id);
                Error::UserNotFound(caller.user_id.to_string())
            })?;
        guard::require_create(creator.id, creator.role).inspect_err(|_| {
            warn!("User {} is not allowed to upload projects", creator.id);
        })?;

        validate(archive)?;
        let fingerprint = fingerprint(archive);

        let project = Project::new(name, fingerprint, creator.id);
        let id = project.id;
        let lease = Arc::new(self.locks.acquire(id).await);

        let record = self.projects.create(project).await?;

        if let Err(e) = self.write_blob(&lease, archive).await {
            error!("Blob write for new project {} failed: {}", id, e);
            return Err(self.undo_create(id, e).await);
        }

        self.metrics.inc_created(archive.len());
        info!(
            "Created project {} ({}) for designer {}",
            id, record.project.name, creator.id
        );
        Ok(record)
    }

    /// Rename a project and/or assign its client.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        update: ProjectUpdate,
        caller: AuthenticatedCaller,
    ) -> Result<ProjectRecord> {
        let _lease = self.locks.acquire(id).await;

        let record = self.projects.get_by_id(id).await?;
        guard::require_modify(caller.user_id, &record).inspect_err(|_| {
            warn!("User {} may not modify project {}", caller.user_id, id);
        })?;

        if update.is_empty() {
            return Err(Error::BadRequest(
                "Client username and project name are both missing".to_string(),
            ));
        }

        // Resolve everything before the first write so a bad field changes nothing.
        let name = update
            .name
            .as_deref()
            .map(validate_project_name)
            .transpose()?;
        let client = match update.client_username.as_deref() {
            Some(username) => Some(self.users.get_by_username(username).await?.ok_or_else(
                || {
                    warn!("User with username {} not found", username);
                    Error::UserNotFound(username.to_string())
                },
            )?),
            None => None,
        };

        let mut updated = record;
        if let Some(client) = client {
            updated = self.projects.update_client(id, client.id).await?;
            info!("Project {} client set to {}", id, client.id);
        }
        if let Some(name) = name {
            updated = self.projects.update_name(id, name).await?;
            info!("Project {} renamed to {}", id, updated.project.name);
        }

        Ok(updated)
    }

    /// Replace a project's archive.
    pub async fn update_archive(
        &self,
        id: Uuid,
        archive: &[u8],
        caller: AuthenticatedCaller,
    ) -> Result<ProjectRecord> {
        let lease = Arc::new(self.locks.acquire(id).await);

        let record = self.projects.get_by_id(id).await?;
        guard::require_modify(caller.user_id, &record).inspect_err(|_| {
            warn!("User {} may not modify project {}", caller.user_id, id);
        })?;

        validate(archive)?;
        let fingerprint = fingerprint(archive);

        if fingerprint == record.fingerprint() {
            // A missing or drifted blob is rewritten from the upload.
            match self.bounded(self.blobs.digest(id)).await {
                Ok(stored) if stored == fingerprint => {
                    debug!("Project {} archive unchanged, skipping blob write", id);
                    return self.projects.update_fingerprint(id, fingerprint).await;
                }
                Ok(_) | Err(Error::BlobNotFound(_)) => {
                    warn!("Project {} blob does not match its record, rewriting it", id);
                }
                Err(e) => return Err(e),
            }
        }

        self.write_blob(&lease, archive).await.inspect_err(|e| {
            error!(
                "Blob write for project {} failed, previous archive kept: {}",
                id, e
            );
        })?;

        match self
            .projects
            .update_fingerprint(id, fingerprint.clone())
            .await
        {
            Ok(updated) => {
                self.metrics.inc_updated(archive.len());
                info!("Project {} archive replaced ({} bytes)", id, archive.len());
                Ok(updated)
            }
            Err(e) => {
                self.metrics.inc_inconsistencies();
                error!(
                    "Project {} blob now has fingerprint {} but metadata still records {}: {}",
                    id,
                    fingerprint,
                    record.fingerprint(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Fetch a project's archive for its designer or client.
    pub async fn read(&self, id: Uuid, caller: AuthenticatedCaller) -> Result<Artifact> {
        let _lease = self.locks.acquire_shared(id).await;
        let record = self.get(id, caller).await?;

        let bytes = match self.bounded(self.blobs.read(id)).await {
            Ok(bytes) => bytes,
            Err(Error::BlobNotFound(_)) => {
                self.metrics.inc_inconsistencies();
                error!("Project {} has a metadata record but no blob", id);
                return Err(Error::inconsistent(id, "project file missing from storage"));
            }
            Err(e) => {
                error!("Reading blob for project {} failed: {}", id, e);
                return Err(e);
            }
        };

        if self.options.verify_on_read {
            let actual = fingerprint(&bytes);
            if actual != record.fingerprint() {
                self.metrics.inc_inconsistencies();
                error!(
                    "Project {} blob fingerprint {} does not match recorded {}",
                    id,
                    actual,
                    record.fingerprint()
                );
                return Err(Error::inconsistent(id, "stored archive does not match its fingerprint"));
            }
        }

        self.metrics.inc_served();
        Ok(Artifact { record, bytes })
    }

    /// Fetch a project's metadata for its designer or client.
    pub async fn get(&self, id: Uuid, caller: AuthenticatedCaller) -> Result<ProjectRecord> {
        let record = self.projects.get_by_id(id).await?;
        guard::require_read(caller.user_id, &record).inspect_err(|_| {
            warn!("User {} may not access project {}", caller.user_id, id);
        })?;
        Ok(record)
    }

    /// Write the blob in a task that owns a share of the lease.
    ///
    /// A timeout only stops the wait: the write keeps running and the lease
    /// stays held until it settles, so a late rename never lands unguarded.
    async fn write_blob(&self, lease: &Arc<ArtifactLease>, bytes: &[u8]) -> Result<()> {
        debug_assert!(lease.is_exclusive());
        let id = lease.id();
        let blobs = self.blobs.clone();
        let held = lease.clone();
        let bytes = bytes.to_vec();
        let write = tokio::spawn(async move {
            let result = blobs.write(id, &bytes).await;
            drop(held);
            result
        });

        let limit = self.options.blob_timeout;
        match tokio::time::timeout(limit, write).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::Internal(format!(
                "blob write task for {} failed: {}",
                id, e
            ))),
            Err(_) => {
                warn!(
                    "Blob write for project {} exceeded {:?}, lease held until it settles ({} artifacts leased)",
                    id,
                    limit,
                    self.locks.active()
                );
                Err(Error::Timeout {
                    seconds: limit.as_secs(),
                })
            }
        }
    }

    async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.options.blob_timeout;
        match tokio::time::timeout(limit, op).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                seconds: limit.as_secs(),
            }),
        }
    }

    /// Remove the record of a create whose blob never landed.
    async fn undo_create(&self, id: Uuid, cause: Error) -> Error {
        match self.projects.delete(id).await {
            Ok(_) => {
                warn!("Removed orphaned metadata record for project {}", id);
                cause
            }
            Err(e) => {
                self.metrics.inc_inconsistencies();
                error!(
                    "Project {} has a metadata record without a blob and could not be removed: {}",
                    id, e
                );
                Error::inconsistent(
                    id,
                    format!("blob write failed ({}) and record cleanup failed ({})", cause, e),
                )
            }
        }
    }
}
