// src/core/blob_store.rs
//! File-backed blob store. Objects are addressed by slash-separated relative
//! keys (`{user_id}/{file}`) under a root directory and served back through a
//! public base URL.

use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a file under the root. Absolute keys and `..` segments
    /// are refused.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        if key.is_empty() || key.ends_with('/') {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Store bytes under `key`. Never overwrites an existing object.
    pub async fn upload(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(key.to_string())
                } else {
                    StorageError::Io {
                        path: path.clone(),
                        source,
                    }
                }
            })?;

        let write = async {
            file.write_all(bytes).await?;
            file.flush().await
        };
        if let Err(source) = write.await {
            warn!("Partial upload for {}, removing it", key);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(StorageError::Io { path, source });
        }

        info!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    pub async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io { path, source }
            }
        })
    }

    /// Delete an object; `Ok(false)` when it was not there.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        crate::core::FsOps::remove_file_if_exists(&path)
            .await
            .map_err(|e| StorageError::Io {
                path,
                source: std::io::Error::other(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BlobStore {
        let root = std::env::temp_dir().join(format!("jobster_blobs_{}", uuid::Uuid::new_v4()));
        BlobStore::new(root, "http://localhost:8000/api/files/")
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let store = store();
        store.upload("user-1/cv.pdf", b"%PDF-1.4").await.unwrap();

        assert_eq!(store.download("user-1/cv.pdf").await.unwrap(), b"%PDF-1.4");
        assert_eq!(
            store.public_url("user-1/cv.pdf"),
            "http://localhost:8000/api/files/user-1/cv.pdf"
        );

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_refuses_to_overwrite() {
        let store = store();
        store.upload("u/cv.pdf", b"first").await.unwrap();

        let err = store.upload("u/cv.pdf", b"second").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(store.download("u/cv.pdf").await.unwrap(), b"first");

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_keys_are_rejected() {
        let store = store();
        for key in ["../escape.pdf", "/etc/passwd", "u/../../cv.pdf", "", "u/"] {
            assert!(
                matches!(store.upload(key, b"x").await, Err(StorageError::InvalidPath(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = store();
        assert!(matches!(
            store.download("nobody/none.pdf").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!store.remove("nobody/none.pdf").await.unwrap());
    }
}
