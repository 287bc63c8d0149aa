//! Media uploads stored on the local filesystem and served under `/public`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// URL prefix stored files are served from.
pub const PUBLIC_PREFIX: &str = "/public";

/// A stored upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredMedia {
    /// Public URL, `/public/<uuid>.<ext>`.
    pub url: String,
}

/// Writes uploads into the configured directory under fresh names.
#[derive(Debug, Clone)]
pub struct MediaService {
    upload_dir: PathBuf,
}

impl MediaService {
    /// Creates the service for `upload_dir`. The directory is created on the
    /// first upload.
    #[must_use]
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Stores `bytes` as `<uuid>.<ext>`, keeping the lowercase extension of
    /// `original_name` when it has one.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an empty file; [`ApiError::StorageError`]
    /// when the file cannot be written.
    pub async fn store(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredMedia, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::invalid_field("file must not be empty"));
        }
        let file_name = stored_name(Uuid::new_v4(), original_name);
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(self.upload_dir.join(&file_name), bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "upload stored");
        Ok(StoredMedia {
            url: format!("{PUBLIC_PREFIX}/{file_name}"),
        })
    }
}

/// File name for an upload: the id, plus the original extension lowercased.
/// Extensions that are not plain ASCII alphanumerics are dropped.
fn stored_name(id: Uuid, original_name: Option<&str>) -> String {
    let extension = original_name
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn keeps_lowercase_extension() {
        let id = Uuid::new_v4();
        assert_eq!(stored_name(id, Some("Photo.JPG")), format!("{id}.jpg"));
        assert_eq!(stored_name(id, Some("archive.tar.gz")), format!("{id}.gz"));
    }

    #[test]
    fn missing_or_odd_extension_gives_bare_id() {
        let id = Uuid::new_v4();
        assert_eq!(stored_name(id, None), id.to_string());
        assert_eq!(stored_name(id, Some("README")), id.to_string());
        assert_eq!(stored_name(id, Some(".bashrc")), id.to_string());
        assert_eq!(stored_name(id, Some("x.p%20g")), id.to_string());
    }

    #[tokio::test]
    async fn writes_file_and_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("offerify-media-{}", Uuid::new_v4()));
        let media = MediaService::new(&dir);
        let Ok(stored) = media.store(Some("logo.PNG"), b"\x89PNG").await else {
            panic!("store failed");
        };
        assert!(stored.url.starts_with("/public/"));
        assert!(stored.url.ends_with(".png"));

        let name = stored.url.trim_start_matches("/public/");
        let Ok(bytes) = tokio::fs::read(dir.join(name)).await else {
            panic!("file missing");
        };
        assert_eq!(bytes, b"\x89PNG");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let media = MediaService::new(std::env::temp_dir());
        assert!(matches!(
            media.store(Some("a.txt"), b"").await,
            Err(ApiError::Validation(_))
        ));
    }
}
