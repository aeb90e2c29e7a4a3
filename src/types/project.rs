//! Project metadata records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::user::UserSummary;

/// Maximum project name length.
pub const MAX_PROJECT_NAME_LEN: usize = 20;

/// Persisted metadata for one uploaded artifact.
///
/// Ownership is stored as plain ids; [`ProjectRecord`] carries the resolved users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Generated at creation, never changes
    pub id: Uuid,
    /// Human-readable label
    pub name: String,
    /// Lowercase hex SHA-256 of the stored archive
    pub content_fingerprint: String,
    /// Last metadata mutation
    pub updated_at: DateTime<Utc>,
    /// Owning designer, set once
    pub designer_id: Uuid,
    /// User granted read access
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

impl Project {
    /// Build a new project with a fresh id.
    pub fn new(name: String, content_fingerprint: String, designer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            content_fingerprint,
            updated_at: Utc::now(),
            designer_id,
            client_id: None,
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A project with its designer and client references resolved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(flatten)]
    pub project: Project,
    pub designer: UserSummary,
    pub client: Option<UserSummary>,
}

impl ProjectRecord {
    pub fn id(&self) -> Uuid {
        self.project.id
    }

    pub fn fingerprint(&self) -> &str {
        &self.project.content_fingerprint
    }
}

/// Fields a designer may change through a metadata update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub client_username: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.client_username.is_none()
    }
}

/// Normalize and check a project name.
pub fn validate_project_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest("Project name is required".to_string()));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(Error::BadRequest(format!(
            "Project name length can't be more than {}",
            MAX_PROJECT_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}
