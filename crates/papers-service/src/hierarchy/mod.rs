//! Folder hierarchy operations.
//!
//! Nodes live in an [`EntityStore`](papers_core::traits::EntityStore);
//! folder tags are maintained so that ancestry checks and subtree queries
//! never have to walk parent links.

pub mod delete;
pub mod locks;
pub mod moving;
pub mod service;
pub mod upload;


pub use delete::DeleteSummary;
pub use locks::FolderLocks;
pub use service::{HierarchyService, NewNode, NodeListing};
