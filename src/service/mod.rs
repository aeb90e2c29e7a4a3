//! Service layer for the artifact store.
//!
//! This module holds the use cases the HTTP boundary calls into: the
//! artifact lifecycle and user registration/login.

pub mod artifact;
pub mod lease;
pub mod users;

pub use artifact::{Artifact, ArtifactOptions, ArtifactService};
pub use lease::{ArtifactLease, ArtifactLocks};
pub use users::UserService;
