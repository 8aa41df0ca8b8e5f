//! Hierarchy node entities.

pub mod model;
pub mod parent;
pub mod patch;
pub mod tag;

pub use model::{FileAttrs, FolderAttrs, Node, NodeKind};
pub use parent::{ParentId, ROOT_SENTINEL};
pub use patch::NodePatch;
pub use tag::Tag;
