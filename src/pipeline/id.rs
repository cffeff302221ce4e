//! Identity types for the export pipeline.
//!
//! A `NodeId` is the stable identity the host assigns to a scene node.
//! Names can collide after a rename, identities cannot, so every graph
//! and step lookup goes through this newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a node in the host scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        NodeId(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::from(42);
        assert_eq!(id, NodeId(42));
        assert_eq!(id.to_string(), "NodeId(42)");
        assert_eq!(format!("{:?}", id), "NodeId(42)");
    }

    #[test]
    fn test_node_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&NodeId(7)).unwrap();
        assert_eq!(json, "7");
        let back: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(back, NodeId(7));
    }
}
