//! Local filesystem artifact store.

use async_trait::async_trait;
use palaver_application::ports::artifact_store::{ArtifactStore, StoreError};
use palaver_domain::{ArtifactHandle, ArtifactKey};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Stores each artifact as a file named after its key.
///
/// Files are created with `create_new`, so an existing key is never
/// overwritten.
pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn put(
        &self,
        key: &ArtifactKey,
        payload: &[u8],
        content_type: &str,
    ) -> Result<ArtifactHandle, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", self.root.display(), e)))?;

        let path = self.root.join(key.as_str());
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    StoreError::Rejected(format!("artifact {} already exists", key))
                }
                _ => StoreError::Io(format!("{}: {}", path.display(), e)),
            })?;
        file.write_all(payload)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = payload.len(), "Wrote artifact");
        Ok(ArtifactHandle {
            kind: key.kind(),
            key: key.as_str().to_string(),
            location: path.display().to_string(),
            content_type: content_type.to_string(),
            size_bytes: payload.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palaver_domain::ArtifactKind;

    #[tokio::test]
    async fn test_put_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemArtifactStore::new(dir.path().join("artifacts"));
        let key = ArtifactKey::generate(ArtifactKind::Image, Utc::now());

        let handle = store.put(&key, b"png bytes", "image/png").await.unwrap();

        assert_eq!(handle.size_bytes, 9);
        assert_eq!(handle.content_type, "image/png");
        let written = std::fs::read(&handle.location).unwrap();
        assert_eq!(written, b"png bytes");
    }

    #[tokio::test]
    async fn test_existing_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());
        let key = ArtifactKey::with_suffix(ArtifactKind::Audio, Utc::now(), "deadbeef");

        store.put(&key, b"first", "audio/mpeg").await.unwrap();
        let second = store.put(&key, b"second", "audio/mpeg").await;

        assert!(matches!(second, Err(StoreError::Rejected(_))));
        let written = std::fs::read(dir.path().join(key.as_str())).unwrap();
        assert_eq!(written, b"first");
    }
}
