//! Soft and hard deletion.

use std::cmp::Reverse;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use papers_core::config::SoftDeleteCascade;
use papers_core::result::AppResult;
use papers_core::types::{FilterField, NodeId};
use papers_entity::node::patch::fields;
use papers_entity::node::{Node, NodePatch, Tag};

use super::service::{HierarchyService, owned_by};
use crate::context::RequestContext;

/// What a delete touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    /// Records marked inactive (soft) or removed (hard).
    pub nodes: u64,
    /// Blobs handed to the blob store for removal.
    pub blobs: u64,
    /// Whether records were removed rather than marked.
    pub hard: bool,
}

impl HierarchyService {
    /// Delete a node.
    ///
    /// A soft delete marks the node inactive and, for a folder, its
    /// contents as configured by `hierarchy.soft_delete_cascade`. A hard
    /// delete removes the node, its blob, and for a folder everything below
    /// it. Blobs are removed before their records, so a failed removal
    /// stops the cascade with the record still pointing at the blob.
    ///
    /// Deleting an id that no longer exists does nothing.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        hard: bool,
    ) -> AppResult<DeleteSummary> {
        if self.store.get(id.into_uuid()).await?.is_none() {
            debug!(user_id = %ctx.user_id, node_id = %id, "Node already deleted");
            return Ok(DeleteSummary {
                hard,
                ..DeleteSummary::default()
            });
        }
        if hard {
            self.hard_delete(ctx, id).await
        } else {
            self.soft_delete(ctx, id).await
        }
    }

    async fn soft_delete(&self, ctx: &RequestContext, id: NodeId) -> AppResult<DeleteSummary> {
        let node = self.load_owned(ctx, id).await?;
        let hide = NodePatch::touched().status(false);

        self.patch(id, &hide).await?;
        let mut summary = DeleteSummary {
            nodes: 1,
            ..DeleteSummary::default()
        };

        if node.is_folder() {
            ctx.check_deadline("soft-deleting folder contents")?;
            // Every node below the folder has a parent among the subtree's
            // folders, so one bulk update over those parents covers it.
            let parents: Vec<NodeId> = match self.config.soft_delete_cascade {
                SoftDeleteCascade::Direct => vec![id],
                SoftDeleteCascade::Subtree => self
                    .subtree_folders(ctx, &node)
                    .await?
                    .iter()
                    .map(|f| f.id)
                    .collect(),
            };
            summary.nodes += self
                .store
                .update_where(
                    &owned_by(ctx).and(FilterField::any_of(fields::PARENT_ID, parents)),
                    &hide,
                )
                .await?;
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %id,
            nodes = summary.nodes,
            cascade = ?self.config.soft_delete_cascade,
            "Node soft-deleted"
        );
        Ok(summary)
    }

    async fn hard_delete(&self, ctx: &RequestContext, id: NodeId) -> AppResult<DeleteSummary> {
        let ctx = ctx.bounded(Duration::from_secs(self.config.cascade_timeout_seconds));
        // Holding every subtree folder keeps creates and moves out of the
        // folders being emptied.
        let (node, subtree, _held) = self.lock_subtree(&ctx, id, None).await?;

        let mut summary = DeleteSummary {
            hard: true,
            ..DeleteSummary::default()
        };
        if node.is_folder() {
            self.purge_subtree(&ctx, subtree, &mut summary).await?;
        } else {
            self.purge_file(&ctx, &node, &mut summary).await?;
        }

        if let Some(parent) = node.parent_id.folder() {
            self.remove_from_folder(parent, id).await.map_err(|e| {
                e.context(format!("Node {id} deleted but still listed in folder {parent}"))
            })?;
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %id,
            nodes = summary.nodes,
            blobs = summary.blobs,
            "Node hard-deleted"
        );
        Ok(summary)
    }

    /// Remove a file's blob, then its record.
    async fn purge_file(
        &self,
        ctx: &RequestContext,
        file: &Node,
        summary: &mut DeleteSummary,
    ) -> AppResult<()> {
        let stopped_at = |e: papers_core::AppError| {
            e.context(format!("Hard delete stopped at file {}", file.id))
        };
        ctx.check_deadline("removing a file").map_err(stopped_at)?;

        if let Some(attrs) = file.as_file() {
            self.blobs.remove(&attrs.uri).await.map_err(stopped_at)?;
            summary.blobs += 1;
        }
        if self
            .store
            .delete(file.id.into_uuid())
            .await
            .map_err(stopped_at)?
        {
            summary.nodes += 1;
        }
        Ok(())
    }

    /// Remove every file and folder of a locked subtree, deepest folders
    /// first.
    async fn purge_subtree(
        &self,
        ctx: &RequestContext,
        mut folders: Vec<Node>,
        summary: &mut DeleteSummary,
    ) -> AppResult<()> {
        folders.sort_by_key(|f| Reverse(f.tag().map_or(0, Tag::depth)));

        for folder in &folders {
            let stopped_at = |e: papers_core::AppError| {
                e.context(format!("Hard delete stopped at folder {}", folder.id))
            };
            let files = self
                .store
                .filter(
                    &owned_by(ctx)
                        .and(FilterField::eq(fields::PARENT_ID, folder.id))
                        .and(FilterField::is(fields::IS_FOLDER, false)),
                )
                .await
                .map_err(stopped_at)?;
            for file in &files {
                self.purge_file(ctx, file, summary).await?;
            }

            ctx.check_deadline("removing a folder").map_err(stopped_at)?;
            if self
                .store
                .delete(folder.id.into_uuid())
                .await
                .map_err(stopped_at)?
            {
                summary.nodes += 1;
            }
        }

        self.locks.forget(folders.iter().map(|f| f.id));
        Ok(())
    }
}
