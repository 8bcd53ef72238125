//! Growth node identifiers.
//!
//! Nodes are created and destroyed at runtime, so they carry UUID v7
//! (time-ordered) identifiers. Species and families use namespaced
//! [`ResourceKey`](crate::ResourceKey)s instead, since they are named in
//! configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a growth node (one rooted tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// A fresh time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
