//! Node boundary status.
//!
//! Every grid node carries a status that decides whether processes may
//! change it and whether material may leave the domain through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boundary status of a grid node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Interior node: updated by every process, receives uplift
    #[default]
    Core,

    /// Open boundary held at its initial elevation (base level)
    FixedValue,

    /// No flow or sediment flux in or out; never updated
    Closed,
}

impl NodeStatus {
    /// Check if this is a core node.
    pub fn is_core(&self) -> bool {
        matches!(self, NodeStatus::Core)
    }

    /// Check if this is a boundary (non-core) node.
    pub fn is_boundary(&self) -> bool {
        !self.is_core()
    }

    /// Check if this node is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, NodeStatus::Closed)
    }

    /// Check if material can pass through this node.
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Core => "core",
            NodeStatus::FixedValue => "fixed_value",
            NodeStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(NodeStatus::Core.is_core());
        assert!(NodeStatus::Core.is_open());
        assert!(NodeStatus::FixedValue.is_boundary());
        assert!(NodeStatus::FixedValue.is_open());
        assert!(NodeStatus::Closed.is_boundary());
        assert!(!NodeStatus::Closed.is_open());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&NodeStatus::FixedValue).unwrap();
        assert_eq!(json, "\"fixed_value\"");
        let parsed: NodeStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, NodeStatus::Closed);
    }
}
