//! # papers-storage
//!
//! [`BlobStore`](papers_core::traits::BlobStore) implementations. File
//! contents live here; the hierarchy only keeps the returned URI.

pub mod local;
pub mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
