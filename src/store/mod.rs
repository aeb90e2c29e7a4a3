//! Persistence layer.
//!
//! Three stores, each behind a trait so the artifact service can be driven
//! against other media:
//!
//! - `blob` - raw archive bytes, one file per artifact id
//! - `project` - project metadata records
//! - `user` - the user directory consumed for ownership and roles

mod atomic;
pub mod blob;
pub mod project;
pub mod user;

pub use blob::{BlobStore, FsBlobStore};
pub use project::{JsonProjectStore, ProjectStore};
pub use user::{JsonUserDirectory, UserDirectory};
