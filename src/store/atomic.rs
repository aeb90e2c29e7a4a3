//! Temp-write-then-rename file replacement.

use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Replace `target` with `bytes` so readers see either the old or the new content.
///
/// The data goes to a uniquely named sibling file that is synced and then
/// renamed over the target. The temp file is removed on any failure.
pub(crate) async fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| Error::Internal(format!("{} has no parent directory", target.display())))?;
    let file_name = target
        .file_name()
        .ok_or_else(|| Error::Internal(format!("{} has no file name", target.display())))?
        .to_string_lossy();
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    if let Err(e) = write_and_sync(&tmp, bytes).await {
        remove_quietly(&tmp).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp, target).await {
        remove_quietly(&tmp).await;
        return Err(e.into());
    }

    sync_dir(dir).await;
    Ok(())
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        debug!("Could not remove temp file {}: {}", path.display(), e);
    }
}

// Best effort: not every platform can fsync a directory handle.
async fn sync_dir(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir).await {
        let _ = handle.sync_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_and_replaces() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("data.json");

        write_atomic(&target, b"first").await.unwrap();
        assert_eq!(fs::read(&target).await.unwrap(), b"first");

        write_atomic(&target, b"second").await.unwrap();
        assert_eq!(fs::read(&target).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("blob");
        write_atomic(&target, b"PK bytes").await.unwrap();

        let mut entries = fs::read_dir(temp.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["blob".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_old_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("missing-dir").join("blob");

        // parent directory does not exist, so the temp file cannot be created
        assert!(write_atomic(&target, b"PK").await.is_err());
        assert!(!target.exists());
    }
}
