//! The canonical node/link store.
//!
//! Both collections are id-keyed insertion-ordered maps, so the lookup
//! index *is* the collection -- it can never go stale between a
//! mutation and a read, and iteration order is deterministic for the
//! renderer and the placement code. All mutations go through
//! [`GraphStore`] methods; raw collection access is never handed out
//! mutably.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::id::{LinkId, ProteinId};
use crate::link::Link;
use crate::node::Node;

/// Immutable record of the node/link ids present right after initial
/// construction. Base elements are never removed by collapse.
#[derive(Debug, Clone, Default)]
pub struct BaseSnapshot {
    nodes: HashSet<ProteinId>,
    links: HashSet<LinkId>,
}

impl BaseSnapshot {
    pub fn contains_node(&self, id: &ProteinId) -> bool {
        self.nodes.contains(id)
    }

    pub fn contains_link(&self, id: &LinkId) -> bool {
        self.links.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// Owns the canonical `nodes` and `links` collections.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IndexMap<ProteinId, Node>,
    links: IndexMap<LinkId, Link>,
}

impl GraphStore {
    pub fn new() -> Self {
        GraphStore::default()
    }

    // -----------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------

    pub fn node(&self, id: &ProteinId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &ProteinId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn link_mut(&mut self, id: &LinkId) -> Option<&mut Link> {
        self.links.get_mut(id)
    }

    pub fn contains_node(&self, id: &ProteinId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_link(&self, id: &LinkId) -> bool {
        self.links.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &ProteinId> {
        self.nodes.keys()
    }

    /// Returns `true` when any link still references `id` as an
    /// endpoint.
    pub fn has_incident_link(&self, id: &ProteinId) -> bool {
        self.links.values().any(|link| link.touches(id))
    }

    // -----------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------

    /// Inserts a node unless its id is already present. Returns `true`
    /// when the node was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Inserts a link unless its id is already present (first-seen
    /// wins). Returns `true` when the link was inserted.
    pub fn add_link(&mut self, link: Link) -> bool {
        if self.links.contains_key(&link.id) {
            return false;
        }
        self.links.insert(link.id.clone(), link);
        true
    }

    /// Removes every node whose id is in `ids`, preserving the order of
    /// the survivors.
    pub fn remove_nodes(&mut self, ids: &[ProteinId]) {
        if ids.is_empty() {
            return;
        }
        let dead: HashSet<&ProteinId> = ids.iter().collect();
        self.nodes.retain(|id, _| !dead.contains(id));
    }

    /// Removes every link whose id is in `ids`, preserving the order of
    /// the survivors.
    pub fn remove_links(&mut self, ids: &[LinkId]) {
        if ids.is_empty() {
            return;
        }
        let dead: HashSet<&LinkId> = ids.iter().collect();
        self.links.retain(|id, _| !dead.contains(id));
    }

    /// Captures the base snapshot. Called exactly once, right after
    /// initial construction.
    pub fn snapshot(&self) -> BaseSnapshot {
        BaseSnapshot {
            nodes: self.nodes.keys().cloned().collect(),
            links: self.links.keys().cloned().collect(),
        }
    }
}
