//! Blob store backed by a local directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::{validate_blob_path, BlobStore};

/// Writes each blob to `<root>/<path>` and hands out `<base_url>/<path>`.
///
/// Parent directories are created on demand.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> StoreResult<PathBuf> {
        validate_blob_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> StoreResult<String> {
        let target = self.full_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &data).await?;
        debug!(path, bytes = data.len(), "blob written");
        Ok(format!("{}/{path}", self.base_url))
    }

    async fn download(&self, path: &str) -> StoreResult<Option<Bytes>> {
        let target = self.full_path(path)?;
        match tokio::fs::read(&target).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn upload_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "http://localhost:8080/v1/images/");
        let url = store
            .upload("recipe-images/42-soup.png", Bytes::from_static(b"soup"), None)
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/v1/images/recipe-images/42-soup.png");
        let on_disk = std::fs::read(dir.path().join("recipe-images").join("42-soup.png")).unwrap();
        assert_eq!(on_disk, b"soup");

        let read = store.download("recipe-images/42-soup.png").await.unwrap().unwrap();
        assert_eq!(&read[..], b"soup");
    }

    #[tokio::test]
    async fn download_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "http://x");
        assert!(store.download("recipe-images/none.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "http://x");
        let err = store
            .upload("../escape.png", Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
