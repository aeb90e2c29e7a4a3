//! User directory.
//!
//! The artifact store only consumes users: it looks them up by id or
//! username to resolve ownership and roles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::atomic::write_atomic;
use crate::types::User;

/// Lookup and registration of user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Add a user. Fails with [`Error::UsernameTaken`] if the username exists.
    async fn create(&self, user: User) -> Result<User>;

    async fn list_all(&self) -> Result<Vec<User>>;
}

/// On-disk shape of the user directory.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserIndex {
    users: HashMap<Uuid, User>,
}

/// User directory persisted as a JSON file.
pub struct JsonUserDirectory {
    index: RwLock<UserIndex>,
    storage_path: PathBuf,
}

impl JsonUserDirectory {
    /// Open the directory stored under `data_dir`, creating it if needed.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let storage_path = data_dir.join("users.json");

        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let index = if fs::try_exists(&storage_path).await? {
            let content = fs::read_to_string(&storage_path).await?;
            serde_json::from_str(&content)?
        } else {
            UserIndex::default()
        };

        Ok(Self {
            index: RwLock::new(index),
            storage_path,
        })
    }

    async fn save(&self, index: &UserIndex) -> Result<()> {
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
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let index = self.index.read().await;
        Ok(index.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let index = self.index.read().await;
        Ok(index
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User> {
        let mut index = self.index.write().await;

        if index.users.values().any(|u| u.username == user.username) {
            return Err(Error::UsernameTaken(user.username));
        }

        index.users.insert(user.id, user.clone());
        if let Err(e) = self.save(&index).await {
            index.users.remove(&user.id);
            error!("User {} not saved: {}", user.id, e);
            return Err(e);
        }

        info!("Created user {} (id: {}, role: {})", user.username, user.id, user.role);
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let index = self.index.read().await;
        let mut users: Vec<User> = index.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
