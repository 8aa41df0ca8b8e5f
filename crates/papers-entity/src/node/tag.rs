//! Materialized-path tags for folders.
//!
//! A root folder's tag is its own id. A child folder's tag is its parent's
//! tag, the separator, and the index the parent minted for it
//! (`parent.last_index` after incrementing). Comparing two tags by whole
//! segments answers "is A an ancestor of B" without walking parent links.

use std::fmt;

use serde::{Deserialize, Serialize};

use papers_core::types::NodeId;
use papers_core::types::path::{SEGMENT_SEPARATOR, is_segment_prefix};

/// A folder's position in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Tag of a top-level folder.
    pub fn root(id: NodeId) -> Self {
        Self(id.to_string())
    }

    /// Tag of the child folder that received `index` from its parent.
    pub fn child(parent: &Tag, index: u64) -> Self {
        Self(format!("{}{}{}", parent.0, SEGMENT_SEPARATOR, index))
    }

    /// Placeholder held by a root folder between insert and tagging.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    /// Whether the tag has not been assigned yet.
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEGMENT_SEPARATOR)
    }

    /// Number of segments (1 for a root folder).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_ancestor_or_self_of(&self, other: &Tag) -> bool {
        is_segment_prefix(&self.0, &other.0)
    }

    /// Whether `self` is a proper ancestor of `other`.
    pub fn is_strict_ancestor_of(&self, other: &Tag) -> bool {
        self.0 != other.0 && self.is_ancestor_or_self_of(other)
    }

    /// Replace the `old_prefix` part of this tag with `new_prefix`.
    ///
    /// Returns `None` when `old_prefix` is not a segment prefix of `self`.
    pub fn rebase(&self, old_prefix: &Tag, new_prefix: &Tag) -> Option<Tag> {
        if !old_prefix.is_ancestor_or_self_of(self) {
            return None;
        }
        let suffix = &self.0[old_prefix.0.len()..];
        Some(Self(format!("{}{}", new_prefix.0, suffix)))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Tag {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}
