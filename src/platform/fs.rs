/// Temporary file cleanup

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait FileCleaner: Send + Sync {
    /// Delete the resource behind a capture reference.
    async fn delete_file(&self, uri: &str) -> Result<()>;
}

/// Deletes `file://` URIs and plain paths with `tokio::fs`.
///
/// Inline references (data URIs, raw base64) have no backing file, so there
/// is nothing to remove and the call succeeds. A plain string made only of
/// base64 characters is inline unless something exists at that path, since
/// base64 payloads may start with `/`. Any other plain string is a path and
/// must still exist.
#[derive(Debug, Clone, Default)]
pub struct FsCleaner;

impl FsCleaner {
    pub fn new() -> Self {
        FsCleaner
    }
}

async fn backing_path(uri: &str) -> Result<Option<PathBuf>> {
    if uri.starts_with("data:") {
        return Ok(None);
    }
    if uri.starts_with("file://") {
        let url = url::Url::parse(uri)
            .map_err(|e| Error::CleanupFailure(format!("invalid URI {}: {}", uri, e)))?;
        let path = url
            .to_file_path()
            .map_err(|_| Error::CleanupFailure(format!("not a local file: {}", uri)))?;
        return Ok(Some(path));
    }
    let path = PathBuf::from(uri);
    if is_base64_text(uri) && !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(None);
    }
    Ok(Some(path))
}

fn is_base64_text(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

#[async_trait]
impl FileCleaner for FsCleaner {
    async fn delete_file(&self, uri: &str) -> Result<()> {
        match backing_path(uri).await? {
            Some(path) => {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| Error::CleanupFailure(format!("{}: {}", path.display(), e)))?;
                log::debug!("removed temporary capture {}", path.display());
                Ok(())
            }
            None => {
                log::debug!("inline capture reference, nothing to delete");
                Ok(())
            }
        }
    }
}
