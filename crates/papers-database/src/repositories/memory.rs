//! In-memory entity store.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use papers_core::result::AppResult;
use papers_core::traits::{Document, EntityStore};
use papers_core::types::Query;

/// Process-local document store backed by a concurrent map.
///
/// Ids are time-ordered, so listing results sorted by id come back in
/// insertion order.
#[derive(Debug)]
pub struct MemoryStore<D: Document> {
    docs: DashMap<Uuid, D>,
}

impl<D: Document> MemoryStore<D> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<D: Document> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: Document> EntityStore<D> for MemoryStore<D> {
    async fn get(&self, id: Uuid) -> AppResult<Option<D>> {
        Ok(self.docs.get(&id).map(|d| d.value().clone()))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<D>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.docs.get(id).map(|d| d.value().clone()))
            .collect())
    }

    async fn filter(&self, query: &Query) -> AppResult<Vec<D>> {
        let mut found: Vec<D> = self
            .docs
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|d| d.id());
        Ok(found)
    }

    async fn insert(&self, mut doc: D) -> AppResult<D> {
        doc.assign_id(Uuid::now_v7());
        self.docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    async fn update(&self, id: Uuid, patch: &D::Patch) -> AppResult<Option<D>> {
        Ok(self.docs.get_mut(&id).map(|mut entry| {
            entry.value_mut().apply(patch);
            entry.value().clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.docs.remove(&id).is_some())
    }

    async fn update_where(&self, query: &Query, patch: &D::Patch) -> AppResult<u64> {
        let mut affected = 0;
        for mut entry in self.docs.iter_mut() {
            if query.matches(entry.value()) {
                entry.value_mut().apply(patch);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_where(&self, query: &Query) -> AppResult<u64> {
        let mut affected = 0;
        self.docs.retain(|_, doc| {
            let matched = query.matches(doc);
            if matched {
                affected += 1;
            }
            !matched
        });
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papers_core::types::{FilterField, UserId};
    use papers_entity::node::{Node, NodePatch, ParentId, Tag};

    fn file(creator: UserId, name: &str) -> Node {
        Node::new_file(name, ParentId::Root, creator, format!("upload/{name}"), 1)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryStore::<Node>::new();
        let stored = store.insert(file(UserId::new(), "a.txt")).await.expect("insert");
        assert!(!stored.id.is_nil());
        let fetched = store.get(stored.id.into_uuid()).await.expect("get");
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn test_get_many_skips_missing_and_keeps_order() {
        let store = MemoryStore::<Node>::new();
        let creator = UserId::new();
        let a = store.insert(file(creator, "a")).await.expect("insert");
        let b = store.insert(file(creator, "b")).await.expect("insert");
        let found = store
            .get_many(&[b.id.into_uuid(), Uuid::now_v7(), a.id.into_uuid()])
            .await
            .expect("get_many");
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_filter_returns_insertion_order() {
        let store = MemoryStore::<Node>::new();
        let creator = UserId::new();
        for name in ["one", "two", "three"] {
            store.insert(file(creator, name)).await.expect("insert");
        }
        store.insert(file(UserId::new(), "other")).await.expect("insert");

        let mine = store
            .filter(&Query::new().and(FilterField::eq("creator", creator)))
            .await
            .expect("filter");
        let names: Vec<_> = mine.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_where() {
        let store = MemoryStore::<Node>::new();
        let creator = UserId::new();
        let folder = store
            .insert(Node::new_folder("d", ParentId::Root, creator, Tag::from("t".to_string())))
            .await
            .expect("insert");
        store.insert(file(creator, "f")).await.expect("insert");

        let hidden = store
            .update_where(
                &Query::new().and(FilterField::is("is_folder", false)),
                &NodePatch::touched().status(false),
            )
            .await
            .expect("update_where");
        assert_eq!(hidden, 1);

        let removed = store
            .delete_where(&Query::new().and(FilterField::is("status", false)))
            .await
            .expect("delete_where");
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);

        assert!(store.delete(folder.id.into_uuid()).await.expect("delete"));
        assert!(!store.delete(folder.id.into_uuid()).await.expect("delete again"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::<Node>::new();
        let res = store
            .update(Uuid::now_v7(), &NodePatch::touched().name("x"))
            .await
            .expect("update");
        assert!(res.is_none());
    }
}
