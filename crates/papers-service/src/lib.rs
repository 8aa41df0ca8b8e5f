//! # papers-service
//!
//! Business logic for Papers. [`HierarchyService`] implements the folder
//! tree operations on top of the entity and blob store traits;
//! [`UserService`] handles registration and login.
//!
//! Services receive their collaborators at construction time as `Arc`s and
//! take an explicit [`RequestContext`] on every call.

pub mod context;
pub mod hierarchy;
pub mod user;

pub use context::RequestContext;
pub use hierarchy::{DeleteSummary, FolderLocks, HierarchyService, NewNode, NodeListing};
pub use user::{LoginResult, RegisterUser, UserService};
