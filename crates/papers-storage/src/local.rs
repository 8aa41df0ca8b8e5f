//! Local filesystem blob store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use papers_core::error::{AppError, ErrorKind};
use papers_core::result::AppResult;
use papers_core::traits::BlobStore;

/// Stores blobs as files under a root directory. URIs are paths relative
/// to that root.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory blobs are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative URI inside the root. Absolute paths and `..`
    /// components are rejected.
    fn resolve(&self, uri: &str) -> AppResult<PathBuf> {
        let relative = Path::new(uri.trim_start_matches('/'));
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(AppError::validation(format!(
                        "Blob path escapes the upload root: {uri}"
                    )));
                }
            }
        }
        if clean.as_os_str().is_empty() {
            return Err(AppError::validation("Blob path is empty"));
        }
        Ok(self.root.join(clean))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, data: Bytes, path: &str) -> AppResult<String> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {path}"), e)
        })?;

        debug!(path, bytes = data.len(), "Saved blob");
        Ok(path.trim_start_matches('/').to_string())
    }

    async fn remove(&self, uri: &str) -> AppResult<()> {
        let full_path = self.resolve(uri)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(uri, "Removed blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove blob: {uri}"),
                e,
            )),
        }
    }

    async fn size(&self, uri: &str) -> AppResult<u64> {
        let full_path = self.resolve(uri)?;
        let meta = fs::metadata(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {uri}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob metadata: {uri}"),
                    e,
                )
            }
        })?;
        Ok(meta.len())
    }
}
