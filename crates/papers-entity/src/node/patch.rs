//! Partial node updates and the store-facing document view of a node.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use papers_core::traits::Document;
use papers_core::types::{FilterValue, NodeId};

use super::model::{Node, NodeKind};
use super::parent::ParentId;
use super::tag::Tag;

/// Field names a node exposes to store queries.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const PARENT_ID: &str = "parent_id";
    pub const CREATOR: &str = "creator";
    pub const STATUS: &str = "status";
    pub const IS_FOLDER: &str = "is_folder";
    pub const TAG: &str = "tag";
    pub const URI: &str = "uri";
}

/// A partial update of a node. `None` leaves the field untouched.
///
/// Folder-only fields are ignored when the patch is applied to a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub parent_id: Option<ParentId>,
    pub status: Option<bool>,
    pub objects: Option<Vec<NodeId>>,
    pub last_index: Option<u64>,
    pub tag: Option<Tag>,
    pub date_modified: Option<DateTime<Utc>>,
}

impl NodePatch {
    /// An empty patch stamped with the current time.
    pub fn touched() -> Self {
        Self {
            date_modified: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent(mut self, parent: ParentId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn status(mut self, status: bool) -> Self {
        self.status = Some(status);
        self
    }

    pub fn objects(mut self, objects: Vec<NodeId>) -> Self {
        self.objects = Some(objects);
        self
    }

    pub fn last_index(mut self, last_index: u64) -> Self {
        self.last_index = Some(last_index);
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Document for Node {
    type Patch = NodePatch;

    fn id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = NodeId::from_uuid(id);
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            fields::ID => Some(FilterValue::String(self.id.to_string())),
            fields::NAME => Some(FilterValue::String(self.name.clone())),
            fields::PARENT_ID => Some(FilterValue::String(self.parent_id.to_string())),
            fields::CREATOR => Some(FilterValue::String(self.creator.to_string())),
            fields::STATUS => Some(FilterValue::Boolean(self.status)),
            fields::IS_FOLDER => Some(FilterValue::Boolean(self.is_folder())),
            fields::TAG => self
                .tag()
                .map(|tag| FilterValue::String(tag.as_str().to_string())),
            fields::URI => self
                .as_file()
                .map(|file| FilterValue::String(file.uri.clone())),
            _ => None,
        }
    }

    fn apply(&mut self, patch: &NodePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(parent) = patch.parent_id {
            self.parent_id = parent;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(modified) = patch.date_modified {
            self.date_modified = modified;
        }
        if let NodeKind::Folder(folder) = &mut self.kind {
            if let Some(objects) = &patch.objects {
                folder.objects = objects.clone();
            }
            if let Some(last_index) = patch.last_index {
                folder.last_index = last_index;
            }
            if let Some(tag) = &patch.tag {
                folder.tag = tag.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papers_core::types::{FilterField, Query, UserId};

    #[test]
    fn test_patch_ignores_folder_fields_on_files() {
        let mut file = Node::new_file("a.txt", ParentId::Root, UserId::new(), "u", 1);
        let before = file.clone();
        file.apply(&NodePatch::default().tag(Tag::from("x".to_string())).last_index(9));
        assert_eq!(file, before);
    }

    #[test]
    fn test_patch_updates_folder() {
        let mut folder = Node::new_folder("d", ParentId::Root, UserId::new(), Tag::unassigned());
        let child = NodeId::new();
        folder.apply(
            &NodePatch::touched()
                .name("renamed")
                .objects(vec![child])
                .last_index(1)
                .tag(Tag::from("r".to_string())),
        );
        assert_eq!(folder.name, "renamed");
        assert_eq!(folder.objects(), &[child]);
        assert_eq!(folder.tag().map(Tag::as_str), Some("r"));
    }

    #[test]
    fn test_query_against_node_fields() {
        let creator = UserId::new();
        let folder = Node::new_folder("d", ParentId::Root, creator, Tag::from("r#1".to_string()));
        let q = Query::new()
            .and(FilterField::eq(fields::CREATOR, creator))
            .and(FilterField::eq(fields::PARENT_ID, "0"))
            .and(FilterField::is(fields::IS_FOLDER, true))
            .and(FilterField::path_prefix(fields::TAG, "r"));
        assert!(q.matches(&folder));

        let file = Node::new_file("f", ParentId::Root, creator, "u", 1);
        assert!(!Query::new().and(FilterField::path_prefix(fields::TAG, "r")).matches(&file));
        assert!(NodePatch::default().is_empty());
    }
}
