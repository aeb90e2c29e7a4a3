//! User registration, listing and login.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{IssuedToken, SessionTokens};
use crate::error::{Error, Result};
use crate::store::UserDirectory;
use crate::types::{validate_username, Role, User, UserSummary};

/// Hash a password for storage and comparison.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// User account operations.
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    tokens: Arc<SessionTokens>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, tokens: Arc<SessionTokens>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user.
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<UserSummary> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(Error::BadRequest("Password is required".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: hash_password(password),
            role,
        };
        let created = self.users.create(user).await.inspect_err(|e| {
            if matches!(e, Error::UsernameTaken(_)) {
                warn!("Username {} already registered", username);
            }
        })?;

        Ok(created.summary())
    }

    /// List every registered user.
    pub async fn list(&self) -> Result<Vec<UserSummary>> {
        Ok(self
            .users
            .list_all()
            .await?
            .iter()
            .map(User::summary)
            .collect())
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let user = self.users.get_by_username(username).await?;

        match user {
            Some(user) if user.password_hash == hash_password(password) => {
                info!("User {} logged in", user.id);
                Ok(self.tokens.issue(user.id, &user.username))
            }
            _ => {
                warn!("Invalid credentials for username {}", username);
                Err(Error::InvalidCredentials)
            }
        }
    }

    /// End the session behind `token`. Returns false if it was already gone.
    pub fn logout(&self, token: &str) -> bool {
        let ended = self.tokens.revoke(token);
        if ended {
            info!("Session ended");
        }
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenVerifier;
    use crate::store::JsonUserDirectory;
    use chrono::Duration;
    use tempfile::TempDir;

    async fn create_test_service() -> (UserService, Arc<SessionTokens>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let users = Arc::new(JsonUserDirectory::new(temp_dir.path()).await.unwrap());
        let tokens = Arc::new(SessionTokens::new(Duration::hours(12)));
        (UserService::new(users, tokens.clone()), tokens, temp_dir)
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("secret"));
        assert_ne!(hash, hash_password("Secret"));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (service, tokens, _temp) = create_test_service().await;

        let user = service
            .register("dana", "secret", Role::Designer)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Designer);

        let issued = service.login("dana", "secret").await.unwrap();
        assert_eq!(issued.id, user.id);
        assert_eq!(tokens.verify(&issued.token).unwrap().user_id, user.id);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (service, _tokens, _temp) = create_test_service().await;
        service
            .register("dana", "secret", Role::Designer)
            .await
            .unwrap();

        assert!(matches!(
            service.login("dana", "wrong").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("ghost", "secret").await,
            Err(Error::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _tokens, _temp) = create_test_service().await;

        assert!(matches!(
            service.register("", "pw", Role::Client).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            service.register("carl", "", Role::Client).await,
            Err(Error::BadRequest(_))
        ));

        service.register("carl", "pw", Role::Client).await.unwrap();
        assert!(matches!(
            service.register("carl", "pw2", Role::Designer).await,
            Err(Error::UsernameTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_list_hides_password_hash() {
        let (service, _tokens, _temp) = create_test_service().await;
        service.register("amy", "pw", Role::Admin).await.unwrap();
        service.register("carl", "pw", Role::Client).await.unwrap();

        let users = service.list().await.unwrap();
        assert_eq!(users.len(), 2);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains(&hash_password("pw")));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let (service, tokens, _temp) = create_test_service().await;
        service
            .register("dana", "secret", Role::Designer)
            .await
            .unwrap();
        let issued = service.login("dana", "secret").await.unwrap();

        assert!(service.logout(&issued.token));
        assert!(matches!(tokens.verify(&issued.token), Err(Error::TokenInvalid)));
        assert!(!service.logout(&issued.token));
        assert!(!service.logout("not-a-token"));
    }
}
