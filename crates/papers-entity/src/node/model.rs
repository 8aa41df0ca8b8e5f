//! Node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use papers_core::types::{NodeId, UserId};

use super::parent::ParentId;
use super::tag::Tag;

/// A file or folder in a user's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Store-assigned identifier.
    pub id: NodeId,
    /// Display name, never empty.
    pub name: String,
    /// Containing folder, or the top level.
    pub parent_id: ParentId,
    /// The owning user. Never changes after creation.
    pub creator: UserId,
    /// `false` once the node has been soft-deleted.
    pub status: bool,
    /// When the node was created.
    pub date_created: DateTime<Utc>,
    /// When the node was last renamed, moved, or deleted.
    pub date_modified: DateTime<Utc>,
    /// File- or folder-specific attributes.
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// The two node kinds and the fields only they carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// A file backed by a blob.
    File(FileAttrs),
    /// A folder containing other nodes.
    Folder(FolderAttrs),
}

/// File-only attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttrs {
    /// Locator of the contents in the blob store.
    pub uri: String,
    /// Content size in bytes.
    pub size: u64,
}

/// Folder-only attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderAttrs {
    /// Ids of the nodes directly contained in this folder, in insertion order.
    #[serde(default)]
    pub objects: Vec<NodeId>,
    /// Number of child folders ever added. Only increases.
    #[serde(default)]
    pub last_index: u64,
    /// Materialized path of this folder.
    pub tag: Tag,
}

impl FolderAttrs {
    /// Append a child id. When the child is a folder, mint and return the
    /// next index for its tag.
    pub fn add_object(&mut self, child: NodeId, child_is_folder: bool) -> Option<u64> {
        self.objects.push(child);
        if child_is_folder {
            self.last_index += 1;
            Some(self.last_index)
        } else {
            None
        }
    }

    /// Strip every occurrence of `child`. Returns whether anything was removed.
    pub fn remove_object(&mut self, child: NodeId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|id| *id != child);
        self.objects.len() != before
    }

    /// Whether `child` is listed.
    pub fn contains(&self, child: NodeId) -> bool {
        self.objects.contains(&child)
    }
}

impl Node {
    /// Build a file node ready for insertion (the store assigns the id).
    pub fn new_file(
        name: impl Into<String>,
        parent_id: ParentId,
        creator: UserId,
        uri: impl Into<String>,
        size: u64,
    ) -> Self {
        Self::new(
            name.into(),
            parent_id,
            creator,
            NodeKind::File(FileAttrs {
                uri: uri.into(),
                size,
            }),
        )
    }

    /// Build a folder node ready for insertion with the given tag.
    pub fn new_folder(
        name: impl Into<String>,
        parent_id: ParentId,
        creator: UserId,
        tag: Tag,
    ) -> Self {
        Self::new(
            name.into(),
            parent_id,
            creator,
            NodeKind::Folder(FolderAttrs {
                objects: Vec::new(),
                last_index: 0,
                tag,
            }),
        )
    }

    fn new(name: String, parent_id: ParentId, creator: UserId, kind: NodeKind) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::nil(),
            name,
            parent_id,
            creator,
            status: true,
            date_created: now,
            date_modified: now,
            kind,
        }
    }

    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    /// Folder attributes, if this node is a folder.
    pub fn as_folder(&self) -> Option<&FolderAttrs> {
        match &self.kind {
            NodeKind::Folder(attrs) => Some(attrs),
            NodeKind::File(_) => None,
        }
    }

    /// Mutable folder attributes, if this node is a folder.
    pub fn as_folder_mut(&mut self) -> Option<&mut FolderAttrs> {
        match &mut self.kind {
            NodeKind::Folder(attrs) => Some(attrs),
            NodeKind::File(_) => None,
        }
    }

    /// File attributes, if this node is a file.
    pub fn as_file(&self) -> Option<&FileAttrs> {
        match &self.kind {
            NodeKind::File(attrs) => Some(attrs),
            NodeKind::Folder(_) => None,
        }
    }

    /// The folder's tag. `None` for files.
    pub fn tag(&self) -> Option<&Tag> {
        self.as_folder().map(|f| &f.tag)
    }

    /// Child ids of a folder; empty for files.
    pub fn objects(&self) -> &[NodeId] {
        self.as_folder().map(|f| f.objects.as_slice()).unwrap_or(&[])
    }

    /// Whether the node has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_has_no_folder_fields() {
        let file = Node::new_file("a.txt", ParentId::Root, UserId::new(), "upload/a.txt", 3);
        assert!(!file.is_folder());
        assert!(file.tag().is_none());
        assert!(file.objects().is_empty());

        let json = serde_json::to_value(&file).expect("serialize");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["parent_id"], "0");
        assert!(json.get("tag").is_none());
        assert!(json.get("objects").is_none());
    }

    #[test]
    fn test_folder_serde_roundtrip_keeps_kind() {
        let folder = Node::new_folder(
            "Docs",
            ParentId::Root,
            UserId::new(),
            Tag::from("x".to_string()),
        );
        let json = serde_json::to_string(&folder).expect("serialize");
        let back: Node = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, folder);
    }

    #[test]
    fn test_add_object_mints_index_only_for_folders() {
        let mut attrs = FolderAttrs::default();
        assert_eq!(attrs.add_object(NodeId::new(), false), None);
        assert_eq!(attrs.add_object(NodeId::new(), true), Some(1));
        assert_eq!(attrs.add_object(NodeId::new(), true), Some(2));
        assert_eq!(attrs.objects.len(), 3);
        assert_eq!(attrs.last_index, 2);
    }

    #[test]
    fn test_remove_object_strips_duplicates_and_keeps_index() {
        let mut attrs = FolderAttrs::default();
        let child = NodeId::new();
        attrs.add_object(child, true);
        attrs.objects.push(child);
        assert!(attrs.remove_object(child));
        assert!(!attrs.contains(child));
        assert!(!attrs.remove_object(child));
        assert_eq!(attrs.last_index, 1);
    }
}
