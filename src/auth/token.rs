//! Bearer tokens.
//!
//! Tokens are opaque v4 UUIDs issued at login and held in memory with an
//! expiry. Nothing secret is compiled in; restarting the server invalidates
//! all sessions.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identity derived from a verified token. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub user_id: Uuid,
}

/// Token handed to a user after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verifies bearer tokens.
pub trait TokenVerifier: Send + Sync {
    /// Resolve a token to its caller, or fail with an authentication error.
    fn verify(&self, token: &str) -> Result<AuthenticatedCaller>;
}

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-memory session token issuer and verifier.
#[derive(Debug)]
pub struct SessionTokens {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionTokens {
    /// Create an issuer whose tokens live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh token for a user.
    pub fn issue(&self, user_id: Uuid, username: &str) -> IssuedToken {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;
        self.sessions.insert(
            token,
            Session {
                user_id,
                expires_at,
            },
        );
        debug!("Issued token for user {} (expires {})", user_id, expires_at);

        IssuedToken {
            id: user_id,
            username: username.to_string(),
            token: token.to_string(),
            expires_at,
        }
    }

    /// Drop a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        Uuid::parse_str(token)
            .map(|t| self.sessions.remove(&t).is_some())
            .unwrap_or(false)
    }

    /// Remove all expired sessions, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        before - self.sessions.len()
    }

    /// Number of live sessions, including expired ones not yet purged.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl TokenVerifier for SessionTokens {
    fn verify(&self, token: &str) -> Result<AuthenticatedCaller> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::MissingToken);
        }
        let key = Uuid::parse_str(token).map_err(|_| Error::TokenMalformed)?;

        let session = *self.sessions.get(&key).ok_or(Error::TokenInvalid)?;
        if session.expires_at <= Utc::now() {
            self.sessions.remove(&key);
            return Err(Error::TokenExpired);
        }

        Ok(AuthenticatedCaller {
            user_id: session.user_id,
        })
    }
}
