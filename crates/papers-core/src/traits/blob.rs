//! Blob store trait for uploaded file contents.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Opaque byte storage keyed by URI.
///
/// The hierarchy never inspects blob contents; it only records the URI
/// returned by [`BlobStore::save`] and hands it back to
/// [`BlobStore::remove`] on hard delete. Never used for folders.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store `data` at the relative `path` and return its URI.
    async fn save(&self, data: Bytes, path: &str) -> AppResult<String>;

    /// Remove a blob. Removing a blob that does not exist is not an error.
    async fn remove(&self, uri: &str) -> AppResult<()>;

    /// Size of a stored blob in bytes.
    async fn size(&self, uri: &str) -> AppResult<u64>;
}
