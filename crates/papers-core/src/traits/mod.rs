//! Collaborator traits defined in `papers-core` and implemented by other crates.

pub mod blob;
pub mod store;

pub use blob::BlobStore;
pub use store::{Document, EntityStore};
