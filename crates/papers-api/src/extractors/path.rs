//! Typed path and form parameter helpers.

use papers_core::error::AppError;
use papers_core::types::{NodeId, UserId};
use papers_entity::node::ParentId;

/// Parses a user id from a path segment.
pub fn parse_user_id(s: &str) -> Result<UserId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid user id: {s}")))
}

/// Parses a node id from a path segment.
pub fn parse_node_id(s: &str) -> Result<NodeId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid node id: {s}")))
}

/// Parses an optional `parent_id` value. Missing, empty, and `"0"` all mean
/// the top level.
pub fn parse_parent(s: Option<&str>) -> Result<Option<NodeId>, AppError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<ParentId>()
            .map(|parent| parent.folder())
            .map_err(|_| AppError::validation(format!("Invalid parent id: {raw}"))),
    }
}
