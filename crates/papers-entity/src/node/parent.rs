//! Parent reference with the root sentinel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use papers_core::types::NodeId;

/// Persisted value of `parent_id` for nodes at the top level.
pub const ROOT_SENTINEL: &str = "0";

/// The containing folder of a node, or the top level.
///
/// Serialized as the folder id string, or as [`ROOT_SENTINEL`] for the
/// top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentId {
    /// The node sits at the top level.
    #[default]
    Root,
    /// The node is contained in this folder.
    Folder(NodeId),
}

impl ParentId {
    /// The containing folder id, if any.
    pub fn folder(&self) -> Option<NodeId> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(*id),
        }
    }

    /// Whether the node sits at the top level.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl From<Option<NodeId>> for ParentId {
    fn from(id: Option<NodeId>) -> Self {
        id.map_or(Self::Root, Self::Folder)
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_SENTINEL),
            Self::Folder(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ParentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ROOT_SENTINEL {
            Ok(Self::Root)
        } else {
            s.parse().map(Self::Folder)
        }
    }
}

impl Serialize for ParentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
