//! Re-parenting nodes.

use std::collections::BTreeSet;

use tracing::{info, warn};

use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::types::{FilterField, NodeId};
use papers_entity::node::patch::fields;
use papers_entity::node::{Node, NodePatch, ParentId, Tag};

use super::locks::HeldLocks;
use super::service::{HierarchyService, not_a_folder, owned_by};
use crate::context::RequestContext;

/// How many times the node is re-read when its parent changes between the
/// first read and taking the locks.
const LOCK_ATTEMPTS: usize = 3;

impl HierarchyService {
    /// Move a node into `destination`, or to the top level when it is `None`.
    ///
    /// A folder cannot be moved into itself or any of its descendants.
    /// Moving a folder gives it a new tag under the destination and rewrites
    /// the tags of every folder below it. Moving a node to the parent it
    /// already has changes nothing.
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        destination: Option<NodeId>,
    ) -> AppResult<Node> {
        let (node, subtree, _held) = self.lock_subtree(ctx, id, destination).await?;
        if destination == Some(id) {
            if !node.is_folder() {
                return Err(not_a_folder(id));
            }
            return Err(AppError::cycle_rejected(format!(
                "Folder {id} cannot be moved into itself"
            )));
        }
        let target = ParentId::from(destination);
        if node.parent_id == target {
            return Ok(node);
        }

        let dest = match destination {
            Some(dest_id) => Some(self.load_destination(ctx, dest_id).await?),
            None => None,
        };
        if let (Some(old_tag), Some(dest_tag)) = (node.tag(), dest.as_ref().and_then(Node::tag)) {
            if old_tag.is_ancestor_or_self_of(dest_tag) {
                return Err(AppError::cycle_rejected(format!(
                    "Folder {id} cannot be moved into its own subtree"
                )));
            }
        }
        ctx.check_deadline("moving a node")?;

        // Attach to the destination first so a failure never leaves the
        // node without a parent listing it.
        let mut new_tag = None;
        if let Some(dest) = &dest {
            let Some(mut attrs) = dest.as_folder().cloned() else {
                return Err(not_a_folder(dest.id));
            };
            let minted = attrs.add_object(id, node.is_folder());
            if let Some(index) = minted {
                new_tag = Some(Tag::child(&attrs.tag, index));
            }
            self.patch(
                dest.id,
                &NodePatch::touched()
                    .objects(attrs.objects)
                    .last_index(attrs.last_index),
            )
            .await?;
        } else if node.is_folder() {
            new_tag = Some(Tag::root(id));
        }

        let mut relink = NodePatch::touched().parent(target);
        if let Some(tag) = &new_tag {
            relink = relink.tag(tag.clone());
        }
        let moved = match self.patch(id, &relink).await {
            Ok(moved) => moved,
            Err(e) => {
                self.undo_attach(dest.as_ref().map(|d| d.id), id).await;
                return Err(e.context(format!("Failed to move node {id}")));
            }
        };

        if let Some(old_parent) = node.parent_id.folder() {
            if let Err(e) = self.remove_from_folder(old_parent, id).await {
                return Err(e.context(format!(
                    "Node {id} moved but could not be removed from folder {old_parent}"
                )));
            }
        }

        if let (Some(old_tag), Some(new_tag)) = (node.tag(), &new_tag) {
            self.rebase_descendants(ctx, id, &subtree, old_tag, new_tag)
                .await?;
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %id,
            from = %node.parent_id,
            to = %target,
            "Node moved"
        );
        Ok(moved)
    }

    /// Read the node and lock it together with its current parent, `extra`,
    /// and for a folder every folder in its subtree, making sure none of
    /// that changed in between. Returns the node and its subtree folders
    /// (the node included; empty for a file).
    pub(super) async fn lock_subtree(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        extra: Option<NodeId>,
    ) -> AppResult<(Node, Vec<Node>, HeldLocks)> {
        for _ in 0..LOCK_ATTEMPTS {
            let seen = self.load_owned(ctx, id).await?;
            let seen_subtree = ids_of(&self.subtree_folders(ctx, &seen).await?);
            let ids = [Some(id), seen.parent_id.folder(), extra]
                .into_iter()
                .flatten()
                .chain(seen_subtree.iter().copied());
            let held = self.locks.acquire(ids).await;

            let current = self.load_owned(ctx, id).await?;
            let subtree = self.subtree_folders(ctx, &current).await?;
            if current.parent_id == seen.parent_id && ids_of(&subtree) == seen_subtree {
                return Ok((current, subtree, held));
            }
        }
        Err(AppError::conflict(format!(
            "Node {id} kept changing while being locked"
        )))
    }

    /// `root` and every folder whose tag extends root's tag. Empty for a
    /// file.
    pub(super) async fn subtree_folders(
        &self,
        ctx: &RequestContext,
        root: &Node,
    ) -> AppResult<Vec<Node>> {
        if !root.is_folder() {
            return Ok(Vec::new());
        }
        let Some(tag) = root.tag().filter(|t| !t.is_unassigned()) else {
            return Ok(vec![root.clone()]);
        };
        let mut folders = self
            .store
            .filter(
                &owned_by(ctx)
                    .and(FilterField::is(fields::IS_FOLDER, true))
                    .and(FilterField::path_prefix(fields::TAG, tag.as_str())),
            )
            .await?;
        if !folders.iter().any(|f| f.id == root.id) {
            folders.push(root.clone());
        }
        Ok(folders)
    }

    /// Remove every occurrence of `child` from `folder`'s objects. A folder
    /// that no longer exists is skipped.
    pub(super) async fn remove_from_folder(&self, folder: NodeId, child: NodeId) -> AppResult<()> {
        let Some(parent) = self.store.get(folder.into_uuid()).await? else {
            warn!(folder_id = %folder, child_id = %child, "Parent folder vanished before detach");
            return Ok(());
        };
        let Some(mut attrs) = parent.as_folder().cloned() else {
            return Ok(());
        };
        if attrs.remove_object(child) {
            self.patch(folder, &NodePatch::touched().objects(attrs.objects))
                .await?;
        }
        Ok(())
    }

    /// Best-effort undo of an attach performed earlier in a failed move.
    async fn undo_attach(&self, folder: Option<NodeId>, child: NodeId) {
        if let Some(folder) = folder {
            if let Err(e) = self.remove_from_folder(folder, child).await {
                warn!(folder_id = %folder, child_id = %child, error = %e, "Failed to undo attach");
            }
        }
    }

    /// Rewrite the tag of every folder below a moved folder. `subtree` was
    /// read while holding the locks of all its folders.
    async fn rebase_descendants(
        &self,
        ctx: &RequestContext,
        moved: NodeId,
        subtree: &[Node],
        old_tag: &Tag,
        new_tag: &Tag,
    ) -> AppResult<()> {
        if old_tag.is_unassigned() {
            return Ok(());
        }
        for folder in subtree.iter().filter(|f| f.id != moved) {
            ctx.check_deadline("retagging descendants")
                .map_err(|e| e.context(format!("Retagging under {moved} stopped at {}", folder.id)))?;
            let Some(rebased) = folder.tag().and_then(|t| t.rebase(old_tag, new_tag)) else {
                continue;
            };
            self.patch(folder.id, &NodePatch::default().tag(rebased))
                .await
                .map_err(|e| e.context(format!("Retagging under {moved} stopped at {}", folder.id)))?;
        }
        Ok(())
    }
}

fn ids_of(nodes: &[Node]) -> BTreeSet<NodeId> {
    nodes.iter().map(|n| n.id).collect()
}
