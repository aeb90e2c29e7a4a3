//! Container format validation.

use crate::error::{Error, Result};

/// Leading bytes of every zip-family archive.
pub const ARCHIVE_MAGIC: [u8; 2] = *b"PK";

/// Check that `bytes` is a non-empty zip-family archive.
///
/// Only the signature is inspected; archive contents are not parsed.
pub fn validate(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::EmptyFile);
    }
    if !bytes.starts_with(&ARCHIVE_MAGIC) {
        return Err(Error::NotAnArchive);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(validate(b""), Err(Error::EmptyFile)));
    }

    #[test]
    fn test_missing_signature_is_rejected() {
        assert!(matches!(validate(b"XY\x03\x04"), Err(Error::NotAnArchive)));
        assert!(matches!(validate(b"pk\x03\x04"), Err(Error::NotAnArchive)));
        // a lone 'P' cannot carry the two byte signature
        assert!(matches!(validate(b"P"), Err(Error::NotAnArchive)));
    }

    #[test]
    fn test_zip_signature_is_accepted() {
        assert!(validate(b"PK").is_ok());
        assert!(validate(b"PK\x03\x04\x14\x00\x00\x00\x08\x00").is_ok());
    }

    #[test]
    fn test_validation_leaves_bytes_untouched() {
        let upload = b"PK\x03\x04rest".to_vec();
        validate(&upload).unwrap();
        assert_eq!(
            crate::archive::fingerprint(&upload),
            crate::archive::fingerprint(b"PK\x03\x04rest")
        );
    }
}
