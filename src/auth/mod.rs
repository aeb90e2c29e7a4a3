//! Authentication and authorization.
//!
//! - `token` turns a bearer token into an [`AuthenticatedCaller`]
//! - `guard` decides what a caller may do with a project

pub mod guard;
pub mod token;

pub use guard::{can_create, can_modify, can_read};
pub use token::{AuthenticatedCaller, IssuedToken, SessionTokens, TokenVerifier};
