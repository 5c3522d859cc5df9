//! Reference-counted expansion provenance.
//!
//! Every node or link introduced by expanding a protein is registered
//! under that owner with a reference count, so collapsing the owner can
//! remove exactly the elements no other expansion still needs. Base
//! graph elements are never counted and never removed.
//!
//! The count map is keyed by [`ElementRef`] rather than a shared string
//! space: node and link ids can never collide.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id::{ElementRef, LinkId, ProteinId};
use crate::store::{BaseSnapshot, GraphStore};

/// Expansion status of one owner protein.
///
/// Explicitly two-state: an owner that was expanded with an empty
/// payload is `Expanded`, distinguishable from one that was never
/// expanded at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanded,
}

/// The node/link ids one expansion introduced.
#[derive(Debug, Clone, Default)]
pub struct ExpansionRecord {
    pub nodes: IndexSet<ProteinId>,
    pub links: IndexSet<LinkId>,
}

/// What a collapse actually removed from the store.
#[derive(Debug, Clone, Default)]
pub struct CollapseOutcome {
    pub removed_nodes: Vec<ProteinId>,
    pub removed_links: Vec<LinkId>,
}

/// Tracks expansion provenance and reference counts for safe collapse.
#[derive(Debug)]
pub struct ExpansionEngine {
    registry: IndexMap<ProteinId, ExpansionRecord>,
    refcounts: HashMap<ElementRef, u32>,
    states: HashMap<ProteinId, ExpansionState>,
    base: BaseSnapshot,
}

impl ExpansionEngine {
    /// Creates an engine over the given base snapshot. Base elements
    /// are exempt from counting and from removal.
    pub fn new(base: BaseSnapshot) -> Self {
        ExpansionEngine {
            registry: IndexMap::new(),
            refcounts: HashMap::new(),
            states: HashMap::new(),
            base,
        }
    }

    /// Current state of an owner. Owners never expanded report
    /// `Collapsed`.
    pub fn state(&self, owner: &ProteinId) -> ExpansionState {
        self.states.get(owner).copied().unwrap_or_default()
    }

    pub fn is_expanded(&self, owner: &ProteinId) -> bool {
        self.state(owner) == ExpansionState::Expanded
    }

    /// The registered record for an owner, if it is expanded.
    pub fn record(&self, owner: &ProteinId) -> Option<&ExpansionRecord> {
        self.registry.get(owner)
    }

    /// Current reference count of an element; base elements and unknown
    /// ids report `None`.
    pub fn refcount(&self, element: &ElementRef) -> Option<u32> {
        self.refcounts.get(element).copied()
    }

    /// Registers the elements one expansion introduced.
    ///
    /// Ids already in the base snapshot are skipped. Every other id is
    /// stored under the owner and its reference count incremented
    /// (created at 1 when absent). Re-registering an id already held by
    /// the same owner is a no-op, which makes repeated merges of the
    /// same payload idempotent.
    pub fn record_expansion(
        &mut self,
        owner: &ProteinId,
        nodes: impl IntoIterator<Item = ProteinId>,
        links: impl IntoIterator<Item = LinkId>,
    ) {
        let entry = self.registry.entry(owner.clone()).or_default();
        for id in nodes {
            if self.base.contains_node(&id) {
                continue;
            }
            let key = ElementRef::Node(id.clone());
            if entry.nodes.insert(id) {
                *self.refcounts.entry(key).or_insert(0) += 1;
            }
        }
        for id in links {
            if self.base.contains_link(&id) {
                continue;
            }
            let key = ElementRef::Link(id.clone());
            if entry.links.insert(id) {
                *self.refcounts.entry(key).or_insert(0) += 1;
            }
        }
        self.states.insert(owner.clone(), ExpansionState::Expanded);
    }

    /// Collapses an owner, removing from `store` every registered
    /// element whose reference count drops to zero.
    ///
    /// Links are released first; a node is then removed only when its
    /// count reached zero *and* no surviving link still touches it --
    /// a shared neighbor that is still wired to another expansion's
    /// links stays, with its count pinned at zero. Returns `None` when
    /// the owner has no registry entry (already collapsed: a no-op, not
    /// an error).
    pub fn collapse(&mut self, owner: &ProteinId, store: &mut GraphStore) -> Option<CollapseOutcome> {
        let Some(record) = self.registry.shift_remove(owner) else {
            debug!("collapse of {owner} ignored: not expanded");
            return None;
        };

        let mut removed_links = Vec::new();
        for id in &record.links {
            if self.release(ElementRef::Link(id.clone())) {
                removed_links.push(id.clone());
            }
        }
        store.remove_links(&removed_links);

        let mut removed_nodes = Vec::new();
        for id in &record.nodes {
            let key = ElementRef::Node(id.clone());
            if !self.release(key.clone()) {
                continue;
            }
            if store.has_incident_link(id) {
                // Still visually connected through some other owner's
                // links; keep it, count pinned at zero.
                self.refcounts.insert(key, 0);
            } else {
                removed_nodes.push(id.clone());
            }
        }
        store.remove_nodes(&removed_nodes);

        // Pinned-at-zero nodes may have just lost their last incident
        // link to a collapse that never owned them; sweep them out.
        let orphans: Vec<ProteinId> = self
            .refcounts
            .iter()
            .filter_map(|(key, count)| match key {
                ElementRef::Node(id) if *count == 0 && !store.has_incident_link(id) => {
                    Some(id.clone())
                }
                _ => None,
            })
            .collect();
        for id in &orphans {
            self.refcounts.remove(&ElementRef::Node(id.clone()));
            removed_nodes.push(id.clone());
        }
        store.remove_nodes(&orphans);

        self.states.insert(owner.clone(), ExpansionState::Collapsed);
        Some(CollapseOutcome {
            removed_nodes,
            removed_links,
        })
    }

    /// Decrements one element's count. Returns `true` when the count
    /// reached zero and the entry was dropped (candidate for removal).
    fn release(&mut self, key: ElementRef) -> bool {
        match self.refcounts.get_mut(&key) {
            Some(count) => {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.refcounts.remove(&key);
                    true
                } else {
                    false
                }
            }
            // Count entry already gone (pinned-at-zero node released by
            // an earlier collapse); treat as removable again.
            None => true,
        }
    }
}
