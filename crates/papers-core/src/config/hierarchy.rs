//! Folder hierarchy policies.

use serde::{Deserialize, Serialize};

/// How far a soft delete of a folder propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDeleteCascade {
    /// The folder and its direct children only.
    #[default]
    Direct,
    /// The folder and every transitive descendant.
    Subtree,
}

/// Hierarchy operation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Soft-delete propagation policy.
    #[serde(default)]
    pub soft_delete_cascade: SoftDeleteCascade,
    /// Upper bound in seconds for a hard-delete cascade, applied on top of
    /// the request deadline.
    #[serde(default = "default_cascade_timeout")]
    pub cascade_timeout_seconds: u64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            soft_delete_cascade: SoftDeleteCascade::default(),
            cascade_timeout_seconds: default_cascade_timeout(),
        }
    }
}

fn default_cascade_timeout() -> u64 {
    120
}
