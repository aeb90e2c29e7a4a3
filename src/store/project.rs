//! Project metadata store.
//!
//! Records are kept in memory and persisted as a single JSON document.
//! Every mutation is written through before it is visible to readers; a
//! failed write rolls the in-memory change back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::atomic::write_atomic;
use crate::store::user::UserDirectory;
use crate::types::{Project, ProjectRecord};

/// Persistence of project metadata records.
///
/// Reads return [`ProjectRecord`]s with designer and client resolved, since
/// authorization decisions depend on them.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, project: Project) -> Result<ProjectRecord>;

    async fn get_by_id(&self, id: Uuid) -> Result<ProjectRecord>;

    async fn update_name(&self, id: Uuid, name: String) -> Result<ProjectRecord>;

    async fn update_fingerprint(&self, id: Uuid, fingerprint: String) -> Result<ProjectRecord>;

    async fn update_client(&self, id: Uuid, client_id: Uuid) -> Result<ProjectRecord>;

    /// Remove a record. Only used to undo a create whose blob write failed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// On-disk shape of the metadata store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectIndex {
    projects: HashMap<Uuid, Project>,
}

/// Project store persisted as a JSON file.
pub struct JsonProjectStore {
    index: RwLock<ProjectIndex>,
    storage_path: PathBuf,
    users: Arc<dyn UserDirectory>,
}

impl JsonProjectStore {
    /// Open the store under `data_dir`, resolving references through `users`.
    pub async fn new(data_dir: &Path, users: Arc<dyn UserDirectory>) -> Result<Self> {
        let storage_path = data_dir.join("projects.json");

        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let index = if fs::try_exists(&storage_path).await? {
            let content = fs::read_to_string(&storage_path).await?;
            serde_json::from_str(&content)?
        } else {
            ProjectIndex::default()
        };

        Ok(Self {
            index: RwLock::new(index),
            storage_path,
            users,
        })
    }

    async fn save(&self, index: &ProjectIndex) -> Result<()> {
        let content = serde_json::to_vec_pretty(index)?;
        write_atomic(&self.storage_path, &content)
            .await
            .map_err(|e| {
                Error::Persistence(format!(
                    "failed to save {}: {}",
                    self.storage_path.display(),
                    e
                ))
            })
    }

    /// Apply `change` to one record, refresh its timestamp and write through.
    async fn mutate<F>(&self, id: Uuid, change: F) -> Result<Project>
    where
        F: FnOnce(&mut Project) + Send,
    {
        let mut index = self.index.write().await;

        let previous = index
            .projects
            .get(&id)
            .cloned()
            .ok_or(Error::ProjectNotFound(id))?;

        let mut updated = previous.clone();
        change(&mut updated);
        updated.touch();
        index.projects.insert(id, updated.clone());

        if let Err(e) = self.save(&index).await {
            index.projects.insert(id, previous);
            error!("Project {} update not saved: {}", id, e);
            return Err(e);
        }

        Ok(updated)
    }

    /// Attach the designer and client users to a project.
    async fn resolve(&self, project: Project) -> Result<ProjectRecord> {
        let designer = self
            .users
            .get_by_id(project.designer_id)
            .await?
            .ok_or_else(|| {
                Error::inconsistent(
                    project.id,
                    format!("designer {} does not exist", project.designer_id),
                )
            })?;

        let client = match project.client_id {
            Some(client_id) => {
                let client = self.users.get_by_id(client_id).await?.ok_or_else(|| {
                    Error::inconsistent(project.id, format!("client {} does not exist", client_id))
                })?;
                Some(client.summary())
            }
            None => None,
        };

        Ok(ProjectRecord {
            project,
            designer: designer.summary(),
            client,
        })
    }
}

#[async_trait]
impl ProjectStore for JsonProjectStore {
    async fn create(&self, project: Project) -> Result<ProjectRecord> {
        {
            let mut index = self.index.write().await;
            if index.projects.contains_key(&project.id) {
                return Err(Error::Persistence(format!(
                    "project {} already exists",
                    project.id
                )));
            }

            index.projects.insert(project.id, project.clone());
            if let Err(e) = self.save(&index).await {
                index.projects.remove(&project.id);
                error!("Project {} not saved into the metadata store: {}", project.id, e);
                return Err(e);
            }
        }

        info!("Project {} saved into the metadata store", project.id);
        self.resolve(project).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<ProjectRecord> {
        let project = {
            let index = self.index.read().await;
            index
                .projects
                .get(&id)
                .cloned()
                .ok_or(Error::ProjectNotFound(id))?
        };
        self.resolve(project).await
    }

    async fn update_name(&self, id: Uuid, name: String) -> Result<ProjectRecord> {
        let project = self.mutate(id, |p| p.name = name).await?;
        self.resolve(project).await
    }

    async fn update_fingerprint(&self, id: Uuid, fingerprint: String) -> Result<ProjectRecord> {
        let project = self
            .mutate(id, |p| p.content_fingerprint = fingerprint)
            .await?;
        self.resolve(project).await
    }

    async fn update_client(&self, id: Uuid, client_id: Uuid) -> Result<ProjectRecord> {
        let project = self.mutate(id, |p| p.client_id = Some(client_id)).await?;
        self.resolve(project).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut index = self.index.write().await;
        let Some(removed) = index.projects.remove(&id) else {
            return Ok(false);
        };

        if let Err(e) = self.save(&index).await {
            index.projects.insert(id, removed);
            return Err(e);
        }

        info!("Project {} removed from the metadata store", id);
        Ok(true)
    }
}
