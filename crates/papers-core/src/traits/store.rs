//! Generic key-addressed document persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::filter::{FilterValue, Query};

/// A document that can live in an [`EntityStore`].
///
/// Stores know nothing about concrete entities: they address documents by
/// id, evaluate [`Query`] conditions through [`Document::field`], and
/// apply typed partial updates through [`Document::apply`].
pub trait Document: Clone + Send + Sync + serde::Serialize + 'static {
    /// Partial update applied by `update` and `update_where`.
    type Patch: Clone + Send + Sync + 'static;

    /// The document's primary key.
    fn id(&self) -> Uuid;

    /// Replace the primary key (used by stores on insert).
    fn assign_id(&mut self, id: Uuid);

    /// Look up a named field for predicate evaluation. `None` when the
    /// field does not exist on this document.
    fn field(&self, name: &str) -> Option<FilterValue>;

    /// Apply a partial update in place.
    fn apply(&mut self, patch: &Self::Patch);
}

/// CRUD interface over a document collection.
///
/// Failures reported by the backend surface as
/// [`ErrorKind::Store`](crate::error::ErrorKind::Store). Deletes are
/// idempotent: removing an id that no longer exists returns `Ok(false)`.
#[async_trait]
pub trait EntityStore<D: Document>: Send + Sync + 'static {
    /// Fetch a document by id.
    async fn get(&self, id: Uuid) -> AppResult<Option<D>>;

    /// Fetch several documents in one round trip. Missing ids are skipped.
    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<D>>;

    /// Return every document matching the query.
    async fn filter(&self, query: &Query) -> AppResult<Vec<D>>;

    /// Insert a document; the store assigns the id and returns the stored copy.
    async fn insert(&self, doc: D) -> AppResult<D>;

    /// Apply a patch to one document and return the updated copy, or
    /// `None` if the id does not exist.
    async fn update(&self, id: Uuid, patch: &D::Patch) -> AppResult<Option<D>>;

    /// Delete one document. Returns whether a document was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Apply a patch to every matching document. Returns the affected count.
    async fn update_where(&self, query: &Query, patch: &D::Patch) -> AppResult<u64>;

    /// Delete every matching document. Returns the affected count.
    async fn delete_where(&self, query: &Query) -> AppResult<u64>;
}
