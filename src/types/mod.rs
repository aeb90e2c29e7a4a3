//! Core type definitions for the artifact store.
//!
//! Projects are owned by this crate; users are consumed from the user
//! directory and only their id and role drive authorization.

pub mod project;
pub mod user;

// Re-export commonly used types
pub use project::*;
pub use user::*;
