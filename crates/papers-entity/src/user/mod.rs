//! User account entities.

pub mod model;

pub use model::{User, UserPatch, normalize_email};
