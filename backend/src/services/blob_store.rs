//! Storage for exported share images.
//!
//! Paths are relative, slash separated and never leave the storage root. The
//! local adapter writes under `STORAGE_DIR`, which the server exposes at
//! `/storage`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("invalid blob path '{0}'")]
    InvalidPath(String),

    #[error("blob I/O failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError>;

    /// Removing a blob that does not exist is not an error
    async fn remove(&self, path: &str) -> Result<(), BlobError>;

    fn public_url(&self, path: &str) -> String;
}

pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(BlobError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        let full_path = self.resolve(path)?;
        let io_err = |source| BlobError::Io {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&full_path, &bytes).await.map_err(io_err)?;

        log::info!(
            "💾 Stored {} ({} bytes, {})",
            path,
            bytes.len(),
            content_type
        );
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        let full_path = self.resolve(path)?;

        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => {
                log::info!("🗑️  Removed {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BlobError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/{}", self.public_base_url, path)
    }
}
