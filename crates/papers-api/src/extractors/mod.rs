//! Custom Axum extractors.

pub mod auth;
pub mod path;

pub use auth::AuthUser;
pub use path::{parse_node_id, parse_parent, parse_user_id};
