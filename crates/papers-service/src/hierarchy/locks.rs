//! Per-folder mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use papers_core::types::NodeId;

/// Lock table keyed by node id.
///
/// Any operation that rewrites a folder's `objects` holds that folder's
/// lock from before the read until after the write. Several locks are
/// always taken in ascending id order so two operations can never wait on
/// each other.
#[derive(Debug, Default)]
pub struct FolderLocks {
    locks: DashMap<NodeId, Arc<Mutex<()>>>,
}

/// Guards returned by [`FolderLocks::acquire`]. Dropping releases them.
#[derive(Debug)]
pub struct HeldLocks {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl FolderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every id in `ids`, ignoring duplicates, in ascending order.
    pub async fn acquire(&self, ids: impl IntoIterator<Item = NodeId>) -> HeldLocks {
        let mut ids: Vec<NodeId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let lock = self.locks.entry(id).or_default().clone();
            guards.push(lock.lock_owned().await);
        }
        HeldLocks { _guards: guards }
    }

    /// Drop the entries of nodes that no longer exist.
    pub fn forget(&self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.locks.remove(&id);
        }
    }

    /// Number of ids with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
