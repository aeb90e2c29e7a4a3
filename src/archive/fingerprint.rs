//! Content fingerprints.
//!
//! A fingerprint is the SHA-256 of the archive bytes, hex encoded in lowercase.

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;

/// Length of a hex encoded fingerprint.
pub const FINGERPRINT_HEX_LEN: usize = 64;

const READ_CHUNK: usize = 64 * 1024;

/// Compute the fingerprint of a byte slice.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute the fingerprint of a stream, reading it to the end.
pub async fn fingerprint_reader<R>(mut reader: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
