//! Creation, lookup, listing, and renaming of nodes.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use papers_core::config::HierarchyConfig;
use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::traits::{BlobStore, EntityStore};
use papers_core::types::{FilterField, NodeId, Query};
use papers_entity::node::patch::fields;
use papers_entity::node::{Node, NodePatch, ParentId, Tag};

use super::locks::FolderLocks;
use crate::context::RequestContext;

/// What kind of node [`HierarchyService::create`] should make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewNode {
    Folder,
    File { uri: String, size: u64 },
}

/// A node as returned by [`HierarchyService::find`], with the child
/// documents of a folder when expansion was requested.
#[derive(Debug, Clone, Serialize)]
pub struct NodeListing {
    #[serde(flatten)]
    pub node: Node,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

/// Operations on a user's file and folder tree.
#[derive(Clone)]
pub struct HierarchyService {
    pub(super) store: Arc<dyn EntityStore<Node>>,
    pub(super) blobs: Arc<dyn BlobStore>,
    pub(super) locks: Arc<FolderLocks>,
    pub(super) config: HierarchyConfig,
}

impl std::fmt::Debug for HierarchyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyService")
            .field("blobs", &self.blobs)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HierarchyService {
    /// Creates a new hierarchy service.
    pub fn new(
        store: Arc<dyn EntityStore<Node>>,
        blobs: Arc<dyn BlobStore>,
        config: HierarchyConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            locks: Arc::new(FolderLocks::new()),
            config,
        }
    }

    /// Create a file or folder, at the top level when `parent` is `None`.
    ///
    /// The parent must be a folder owned by the caller. A new folder's tag
    /// extends the parent's tag with the index the parent mints for it.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: Option<NodeId>,
        new: NewNode,
    ) -> AppResult<Node> {
        let name = validate_name(name)?;
        ctx.check_deadline("creating a node")?;

        let Some(parent_id) = parent else {
            return self.create_at_root(ctx, name, new).await;
        };

        let _held = self.locks.acquire([parent_id]).await;
        let parent = self.load_destination(ctx, parent_id).await?;
        let Some(mut attrs) = parent.as_folder().cloned() else {
            return Err(not_a_folder(parent_id));
        };

        let draft = match new {
            NewNode::Folder => Node::new_folder(
                name,
                ParentId::Folder(parent_id),
                ctx.user_id,
                Tag::child(&attrs.tag, attrs.last_index + 1),
            ),
            NewNode::File { uri, size } => {
                Node::new_file(name, ParentId::Folder(parent_id), ctx.user_id, uri, size)
            }
        };
        let child = self.store.insert(draft).await?;

        attrs.add_object(child.id, child.is_folder());
        let attach = NodePatch::touched()
            .objects(attrs.objects)
            .last_index(attrs.last_index);
        if let Err(e) = self.patch(parent_id, &attach).await {
            self.discard(child.id).await;
            return Err(e.context(format!(
                "Failed to attach node {} to folder {parent_id}",
                child.id
            )));
        }

        info!(
            user_id = %ctx.user_id,
            node_id = %child.id,
            parent_id = %parent_id,
            is_folder = child.is_folder(),
            "Node created"
        );
        Ok(child)
    }

    async fn create_at_root(
        &self,
        ctx: &RequestContext,
        name: String,
        new: NewNode,
    ) -> AppResult<Node> {
        let node = match new {
            NewNode::File { uri, size } => {
                self.store
                    .insert(Node::new_file(name, ParentId::Root, ctx.user_id, uri, size))
                    .await?
            }
            NewNode::Folder => {
                // The root tag is the folder's own id, known only after insert.
                let stored = self
                    .store
                    .insert(Node::new_folder(
                        name,
                        ParentId::Root,
                        ctx.user_id,
                        Tag::unassigned(),
                    ))
                    .await?;
                let tag = NodePatch::default().tag(Tag::root(stored.id));
                match self.patch(stored.id, &tag).await {
                    Ok(tagged) => tagged,
                    Err(e) => {
                        self.discard(stored.id).await;
                        return Err(e.context(format!("Failed to tag folder {}", stored.id)));
                    }
                }
            }
        };

        info!(
            user_id = %ctx.user_id,
            node_id = %node.id,
            is_folder = node.is_folder(),
            "Node created at top level"
        );
        Ok(node)
    }

    /// Shorthand for creating a folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent: Option<NodeId>,
    ) -> AppResult<Node> {
        self.create(ctx, name, parent, NewNode::Folder).await
    }

    /// Fetch a node. With `expand`, a folder's children are resolved to
    /// full documents in one batch read, in `objects` order.
    pub async fn find(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        expand: bool,
    ) -> AppResult<NodeListing> {
        let node = self.load_owned(ctx, id).await?;
        let children = if expand && node.is_folder() {
            let ids: Vec<Uuid> = node.objects().iter().map(|id| id.into_uuid()).collect();
            Some(if ids.is_empty() {
                Vec::new()
            } else {
                self.store.get_many(&ids).await?
            })
        } else {
            None
        };
        Ok(NodeListing { node, children })
    }

    /// Active top-level nodes owned by the caller.
    pub async fn list_root(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.store
            .filter(
                &owned_by(ctx)
                    .and(FilterField::eq(fields::PARENT_ID, ParentId::Root))
                    .and(FilterField::is(fields::STATUS, true)),
            )
            .await
    }

    /// Every node owned by the caller, soft-deleted ones included.
    pub async fn list_all(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.store.filter(&owned_by(ctx)).await
    }

    /// Change a node's display name.
    pub async fn rename(&self, ctx: &RequestContext, id: NodeId, name: &str) -> AppResult<Node> {
        let name = validate_name(name)?;
        self.load_owned(ctx, id).await?;
        let node = self.patch(id, &NodePatch::touched().name(name)).await?;
        info!(user_id = %ctx.user_id, node_id = %id, name = %node.name, "Node renamed");
        Ok(node)
    }

    /// Load a node the caller owns. Nodes of other users are reported as
    /// missing.
    pub(super) async fn load_owned(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        match self.store.get(id.into_uuid()).await? {
            Some(node) if node.creator == ctx.user_id => Ok(node),
            _ => Err(AppError::not_found(format!("Node {id} not found"))),
        }
    }

    /// Load a folder the caller owns that nodes can be placed in.
    pub(super) async fn load_destination(
        &self,
        ctx: &RequestContext,
        id: NodeId,
    ) -> AppResult<Node> {
        let node = self.load_owned(ctx, id).await?;
        if !node.is_folder() {
            return Err(not_a_folder(id));
        }
        Ok(node)
    }

    /// Apply a patch to a node that must exist.
    pub(super) async fn patch(&self, id: NodeId, patch: &NodePatch) -> AppResult<Node> {
        self.store
            .update(id.into_uuid(), patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Best-effort removal of a record written earlier in a failed operation.
    pub(super) async fn discard(&self, id: NodeId) {
        if let Err(e) = self.store.delete(id.into_uuid()).await {
            warn!(node_id = %id, error = %e, "Failed to discard partially created node");
        }
    }
}

/// Query matching every node owned by the caller.
pub(super) fn owned_by(ctx: &RequestContext) -> Query {
    Query::new().and(FilterField::eq(fields::CREATOR, ctx.user_id))
}

pub(super) fn not_a_folder(id: NodeId) -> AppError {
    AppError::validation(format!("Node {id} is not a folder"))
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    Ok(name.to_string())
}
