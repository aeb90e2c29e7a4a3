//! Error types for the artifact store.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for artifact store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the artifact store.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Authentication Errors =====
    #[error("Missing or bad authentication")]
    MissingToken,

    #[error("Token has invalid format")]
    TokenMalformed,

    #[error("Token is not recognised")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // ===== Authorization Errors =====
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ===== Lookup Errors =====
    #[error("Project with id {0} not found")]
    ProjectNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(String),

    // ===== Validation Errors =====
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Empty project file")]
    EmptyFile,

    #[error("Project file is not a zip archive")]
    NotAnArchive,

    #[error("Username {0} already in use")]
    UsernameTaken(String),

    #[error("Project file exceeds the upload size limit")]
    PayloadTooLarge,

    // ===== Storage Errors =====
    #[error("Blob for artifact {0} not found")]
    BlobNotFound(Uuid),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Inconsistent artifact {id}: {detail}")]
    Inconsistent { id: Uuid, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout: operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl Error {
    /// Create an inconsistency error for an artifact.
    pub fn inconsistent(id: Uuid, detail: impl Into<String>) -> Self {
        Self::Inconsistent {
            id,
            detail: detail.into(),
        }
    }

    /// HTTP status code this error maps to at the boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken
            | Self::TokenMalformed
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::ProjectNotFound(_) | Self::UserNotFound(_) => 404,
            Self::InvalidCredentials
            | Self::BadRequest(_)
            | Self::EmptyFile
            | Self::NotAnArchive
            | Self::UsernameTaken(_) => 400,
            Self::PayloadTooLarge => 413,
            Self::BlobNotFound(_)
            | Self::Persistence(_)
            | Self::Inconsistent { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Internal(_)
            | Self::Config(_)
            | Self::Timeout { .. } => 500,
        }
    }

    /// Check if this error is a server-side failure rather than a client mistake.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Check if this error came from token verification.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::TokenMalformed | Self::TokenInvalid | Self::TokenExpired
        )
    }

    /// Message safe to show to callers. Server errors are reduced to a generic text.
    pub fn public_message(&self) -> String {
        match self {
            Self::Timeout { .. } => "Storage operation timed out".to_string(),
            Self::BlobNotFound(_) | Self::Inconsistent { .. } => {
                "Project file not available on the server".to_string()
            }
            e if e.is_server_error() => "Internal server error".to_string(),
            e => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            Error::ProjectNotFound(id).to_string(),
            "Project with id 00000000-0000-0000-0000-000000000000 not found"
        );
        assert_eq!(
            Error::UserNotFound("ghost".to_string()).to_string(),
            "User ghost not found"
        );
        assert_eq!(Error::EmptyFile.to_string(), "Empty project file");
        assert_eq!(
            Error::NotAnArchive.to_string(),
            "Project file is not a zip archive"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::TokenExpired.status_code(), 401);
        assert_eq!(Error::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(Error::Forbidden("x".into()).status_code(), 403);
        assert_eq!(Error::ProjectNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(Error::UserNotFound("x".into()).status_code(), 404);
        assert_eq!(Error::EmptyFile.status_code(), 400);
        assert_eq!(Error::NotAnArchive.status_code(), 400);
        assert_eq!(Error::UsernameTaken("x".into()).status_code(), 400);
        assert_eq!(Error::PayloadTooLarge.status_code(), 413);
        assert!(!Error::PayloadTooLarge.is_server_error());
        assert_eq!(Error::BlobNotFound(Uuid::nil()).status_code(), 500);
        assert_eq!(Error::Timeout { seconds: 3 }.status_code(), 500);
    }

    #[test]
    fn test_authentication_is_distinct_from_authorization() {
        assert!(Error::TokenMalformed.is_authentication());
        assert!(Error::MissingToken.is_authentication());
        assert!(!Error::Unauthorized("not owner".into()).is_authentication());
        assert!(!Error::Forbidden("role".into()).is_authentication());
    }

    #[test]
    fn test_public_message_hides_internals() {
        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/data/projects/secret path",
        ));
        assert!(io.is_server_error());
        assert_eq!(io.public_message(), "Internal server error");

        let inconsistent = Error::inconsistent(Uuid::nil(), "fingerprint mismatch");
        assert!(!inconsistent.public_message().contains("fingerprint"));

        let bad = Error::BadRequest("name too long".into());
        assert_eq!(bad.public_message(), "Bad request: name too long");
    }

    #[test]
    fn test_timeout_display() {
        let timeout = Error::Timeout { seconds: 30 };
        assert_eq!(
            timeout.to_string(),
            "Timeout: operation timed out after 30 seconds"
        );
    }
}
