//! User accounts and roles.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum username length accepted at registration.
pub const MAX_USERNAME_LEN: usize = 10;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}_.\-]+$").expect("username pattern is a valid regex")
});

/// Role of a user. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Admin = 0,
    Designer = 1,
    Client = 2,
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role as u8
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Admin),
            1 => Ok(Role::Designer),
            2 => Ok(Role::Client),
            other => Err(format!("unknown role code {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Designer => write!(f, "designer"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl User {
    /// Public view of the user, without the password hash.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The part of a user that is safe to return to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Check a username against the registration rules.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::BadRequest(format!(
            "Username length must be between 1 and {}",
            MAX_USERNAME_LEN
        )));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(Error::BadRequest(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(())
}
