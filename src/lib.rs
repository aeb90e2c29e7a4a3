//! Artifact Store - project archive service
//!
//! Accepts zip archives for design projects, fingerprints them, stores the
//! bytes and a metadata record side by side, and serves them back only to the
//! project's designer or assigned client.
//!
//! # Architecture
//!
//! 1. **Archive** (`archive`) - content fingerprinting and archive format checks
//! 2. **Store** (`store`) - blob storage and JSON-backed metadata/user records
//! 3. **Auth** (`auth`) - session tokens and ownership/role rules
//! 4. **Service** (`service`) - the artifact use cases, per-artifact leases, users
//! 5. **HTTP** (`http`) - axum router mapping requests onto the services
//!
//! # Consistency
//!
//! Blob storage and metadata share no transaction. The artifact service orders
//! its writes so that a failure leaves either the old pair or no record at all,
//! and serializes mutations of one artifact behind a lease.

pub mod archive;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod service;
pub mod store;
pub mod types;

pub use error::{Error, Result};

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
