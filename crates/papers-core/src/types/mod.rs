//! Core type definitions used across the Papers workspace.

pub mod filter;
pub mod id;
pub mod path;

pub use filter::{FilterField, FilterOp, FilterValue, Query};
pub use id::*;
