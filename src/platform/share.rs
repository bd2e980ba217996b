/// Share capability and the outbox-directory share target

use crate::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as Base64Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// What gets handed to the native share surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub title: String,
    pub message: String,
    /// Resource reference from the capture (file URI, data URI or base64)
    pub url: String,
    /// MIME type of the shared image
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Resolves when the user completes the share. Cancellation and failures
    /// are errors (`Error::ShareCancelled` / `Error::ShareRejected`).
    async fn share(&self, request: &ShareRequest) -> Result<()>;
}

/// Sidecar metadata written next to every shared image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedItem {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub file: String,
}

/// Desktop stand-in for a share sheet: drops the image and a JSON sidecar
/// into an outbox directory.
#[derive(Debug, Clone)]
pub struct DirectoryShareTarget {
    outbox: PathBuf,
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        _ => "bin",
    }
}

impl DirectoryShareTarget {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    async fn load_payload(url: &str) -> Result<Vec<u8>> {
        if let Some(rest) = url.strip_prefix("data:") {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::ShareRejected("malformed data URI".into()))?;
            if !meta.ends_with(";base64") {
                return Err(Error::ShareRejected("only base64 data URIs are supported".into()));
            }
            return STANDARD
                .decode(data)
                .map_err(|e| Error::ShareRejected(format!("invalid base64 payload: {}", e)));
        }
        if url.starts_with("file://") {
            let path = url::Url::parse(url)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| Error::ShareRejected(format!("invalid file URI {}", url)))?;
            return tokio::fs::read(&path)
                .await
                .map_err(|e| {
                    Error::ShareRejected(format!("cannot read {}: {}", path.display(), e))
                });
        }
        if tokio::fs::try_exists(url).await.unwrap_or(false) {
            return Ok(tokio::fs::read(url).await?);
        }
        STANDARD
            .decode(url)
            .map_err(|_| Error::ShareRejected("unsupported resource reference".into()))
    }

    /// Share and return the path of the written image.
    pub async fn share_to_path(&self, request: &ShareRequest) -> Result<PathBuf> {
        let bytes = Self::load_payload(&request.url).await?;
        if bytes.is_empty() {
            return Err(Error::ShareRejected("empty image payload".into()));
        }

        let digest = hex::encode(Sha256::digest(&bytes));
        let name = format!("scoreshare-{}.{}", &digest[..16], extension_for(&request.mime_type));
        tokio::fs::create_dir_all(&self.outbox).await?;
        let image_path = self.outbox.join(&name);
        tokio::fs::write(&image_path, &bytes).await?;

        let item = SharedItem {
            title: request.title.clone(),
            message: request.message.clone(),
            mime_type: request.mime_type.clone(),
            file: name.clone(),
        };
        let sidecar = self.outbox.join(format!("{}.json", name));
        tokio::fs::write(&sidecar, serde_json::to_vec_pretty(&item)?).await?;

        log::info!("shared {} to {}", name, self.outbox.display());
        Ok(image_path)
    }
}

#[async_trait]
impl ShareTarget for DirectoryShareTarget {
    async fn share(&self, request: &ShareRequest) -> Result<()> {
        self.share_to_path(request).await.map(|_| ())
    }
}
