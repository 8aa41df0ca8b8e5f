//! In-memory blob store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::traits::BlobStore;

/// Keeps blobs in a map and records every removal.
///
/// Used with the in-memory entity store so the service can run without
/// touching the filesystem. Removal failures can be switched on to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
    removed: Mutex<Vec<String>>,
    fail_removes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob is stored under `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.blobs.contains_key(uri)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Every URI passed to a successful `remove`, in call order.
    pub fn removed(&self) -> Vec<String> {
        self.removed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Make every following `remove` fail with a storage error.
    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, data: Bytes, path: &str) -> AppResult<String> {
        let uri = path.trim_start_matches('/').to_string();
        if uri.is_empty() {
            return Err(AppError::validation("Blob path is empty"));
        }
        self.blobs.insert(uri.clone(), data);
        Ok(uri)
    }

    async fn remove(&self, uri: &str) -> AppResult<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Failed to remove blob: {uri}")));
        }
        self.blobs.remove(uri);
        if let Ok(mut log) = self.removed.lock() {
            log.push(uri.to_string());
        }
        Ok(())
    }

    async fn size(&self, uri: &str) -> AppResult<u64> {
        self.blobs
            .get(uri)
            .map(|b| b.len() as u64)
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {uri}")))
    }
}
