//! Archive checks and content fingerprints.
//!
//! Both operate on borrowed bytes, so validation, hashing and storage are
//! independent passes over the same upload.

pub mod fingerprint;
pub mod validate;

pub use fingerprint::{fingerprint, fingerprint_reader, FINGERPRINT_HEX_LEN};
pub use validate::{validate, ARCHIVE_MAGIC};
