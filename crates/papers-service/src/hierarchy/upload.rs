//! Storing uploaded file contents as file nodes.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use papers_core::result::AppResult;
use papers_core::types::NodeId;
use papers_entity::node::Node;

use super::service::{HierarchyService, NewNode};
use crate::context::RequestContext;

impl HierarchyService {
    /// Save `data` to the blob store under the caller's upload directory and
    /// create a file node for it.
    ///
    /// Each upload gets its own blob, `upload/{user}/{key}/{file_name}`, so
    /// files sharing a name never share contents.
    ///
    /// `file_name` must already be sanitized. When the node cannot be
    /// created the blob is removed again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        parent: Option<NodeId>,
        file_name: &str,
        data: Bytes,
    ) -> AppResult<Node> {
        if let Some(parent_id) = parent {
            self.load_destination(ctx, parent_id).await?;
        }
        ctx.check_deadline("saving upload")?;

        let path = format!("upload/{}/{}/{}", ctx.user_id, Uuid::now_v7(), file_name);
        let uri = self.blobs.save(data, &path).await?;

        let created = match self.blobs.size(&uri).await {
            Ok(size) => {
                self.create(
                    ctx,
                    file_name,
                    parent,
                    NewNode::File {
                        uri: uri.clone(),
                        size,
                    },
                )
                .await
            }
            Err(e) => Err(e),
        };

        match created {
            Ok(node) => {
                info!(user_id = %ctx.user_id, node_id = %node.id, uri = %uri, "File uploaded");
                Ok(node)
            }
            Err(e) => {
                if let Err(cleanup) = self.blobs.remove(&uri).await {
                    warn!(uri = %uri, error = %cleanup, "Failed to remove blob of failed upload");
                }
                Err(e)
            }
        }
    }
}
