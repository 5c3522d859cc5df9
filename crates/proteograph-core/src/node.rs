//! Graph nodes.

use serde::{Deserialize, Serialize};

use crate::id::ProteinId;

/// Node role within the graph. Exactly one `Main` node exists per
/// graph instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Main,
    Interactor,
}

/// A rendered protein node.
///
/// Positions are written once at creation (by the store or the cluster
/// placement) and thereafter owned by the external layout simulator;
/// `fixed` pins a node against the simulation (the main node, or a node
/// being dragged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: ProteinId,
    pub label: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub fixed: bool,
    pub radius: f64,
}

impl Node {
    /// Creates the main node, pinned at the given position.
    pub fn main(id: ProteinId, position: (f64, f64), radius: f64) -> Self {
        let label = id.to_string();
        Node {
            id,
            label,
            kind: NodeKind::Main,
            x: position.0,
            y: position.1,
            fixed: true,
            radius,
        }
    }

    /// Creates an interactor node at the given position, unpinned.
    pub fn interactor(id: ProteinId, position: (f64, f64), radius: f64) -> Self {
        let label = id.to_string();
        Node {
            id,
            label,
            kind: NodeKind::Interactor,
            x: position.0,
            y: position.1,
            fixed: false,
            radius,
        }
    }

    pub fn is_main(&self) -> bool {
        self.kind == NodeKind::Main
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_node_is_pinned_at_creation() {
        let node = Node::main("TP53".into(), (400.0, 300.0), 26.0);
        assert!(node.fixed);
        assert!(node.is_main());
        assert_eq!((node.x, node.y), (400.0, 300.0));
        assert_eq!(node.label, "TP53");
    }

    #[test]
    fn interactor_node_is_free() {
        let node = Node::interactor("MDM2".into(), (10.0, 20.0), 14.0);
        assert!(!node.fixed);
        assert!(!node.is_main());
    }
}
