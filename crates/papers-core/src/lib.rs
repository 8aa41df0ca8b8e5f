//! # papers-core
//!
//! Core crate for Papers. Contains the collaborator traits (entity store,
//! blob store), configuration schemas, typed identifiers, the query
//! specification types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Papers crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
