//! The interaction model: the stateful coordinator that owns the store,
//! the depth map, the expansion engine, and the cluster map, and keeps
//! them consistent across builds, merges, and collapses.
//!
//! All mutation goes through [`InteractionModel`]; the sub-structures
//! never reference each other directly. A merge is atomic from the
//! caller's point of view -- validation happens before any state is
//! touched, and a failed precondition leaves the model exactly as it
//! was.

use indexmap::{IndexMap, IndexSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cluster::{ring_point, Cluster, ClusterMap};
use crate::config::ModelConfig;
use crate::depth::compute_depths;
use crate::effect::EffectKind;
use crate::error::GraphError;
use crate::expansion::{CollapseOutcome, ExpansionEngine, ExpansionState};
use crate::id::{LinkId, ProteinId};
use crate::interaction::{
    FetchOutcome, InteractionKind, NetworkPayload, SubgraphPayload, SubgraphSource,
};
use crate::link::Link;
use crate::node::Node;
use crate::store::{BaseSnapshot, GraphStore};

/// A structural change applied to the graph, for observers (renderers,
/// replay logs).
#[derive(Debug, Clone)]
pub enum GraphChange {
    Merged {
        owner: ProteinId,
        added_nodes: Vec<ProteinId>,
        added_links: Vec<LinkId>,
    },
    Collapsed {
        owner: ProteinId,
        removed_nodes: Vec<ProteinId>,
        removed_links: Vec<LinkId>,
    },
}

/// What one merge changed, returned to the caller.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub owner: ProteinId,
    pub added_nodes: Vec<ProteinId>,
    pub added_links: Vec<LinkId>,
    /// Links from the payload that already existed in the graph and
    /// were registered for the owner without being recreated.
    pub reused_links: usize,
}

/// A serializable view of the whole model, for export and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSnapshot {
    pub root: ProteinId,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub depths: IndexMap<ProteinId, u32>,
    pub clusters: Vec<Cluster>,
}

type ChangeObserver = Box<dyn FnMut(&GraphChange)>;

/// The graph-state engine for one queried protein.
pub struct InteractionModel {
    cfg: ModelConfig,
    root: ProteinId,
    store: GraphStore,
    base: BaseSnapshot,
    depths: IndexMap<ProteinId, u32>,
    engine: ExpansionEngine,
    clusters: ClusterMap,
    observer: Option<ChangeObserver>,
}

impl InteractionModel {
    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    /// Builds the initial graph from a full network payload.
    ///
    /// The main protein is pinned at the viewport center; interactors
    /// start at a seeded jitter around it and are then owned by the
    /// external layout. Interactions with an endpoint not in the
    /// protein list are dropped. The state of the store right after
    /// this call is the immutable base snapshot.
    pub fn build(payload: NetworkPayload, cfg: ModelConfig) -> Result<Self, GraphError> {
        let main = payload.main.trim();
        if main.is_empty() {
            return Err(GraphError::MissingRoot);
        }
        let root = ProteinId::from(main);

        let proteins: IndexSet<ProteinId> = payload
            .proteins
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(ProteinId::from)
            .collect();
        if proteins.is_empty() {
            return Err(GraphError::EmptyNetwork);
        }

        let mut store = GraphStore::new();
        store.add_node(Node::main(root.clone(), cfg.center, cfg.main_radius));

        // Seeded jitter keeps builds reproducible run to run.
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        let j = cfg.jitter_radius;
        for id in proteins {
            if id == root {
                continue;
            }
            let position = (
                cfg.center.0 + rng.gen_range(-j..=j),
                cfg.center.1 + rng.gen_range(-j..=j),
            );
            store.add_node(Node::interactor(id, position, cfg.node_radius));
        }

        let mut pairs = Vec::with_capacity(payload.interactions.len());
        for raw in payload.interactions {
            let effect = EffectKind::classify(&raw.arrow, &raw.intent);
            let (source, target) = raw.endpoints();
            if !store.contains_node(&source) || !store.contains_node(&target) {
                debug!("dropping interaction with unknown endpoint: {source} / {target}");
                continue;
            }
            if store.add_link(Link::from_raw(raw, effect)) {
                pairs.push((source, target));
            }
        }

        let depths = compute_depths(&pairs, &root);
        let base = store.snapshot();
        info!(
            nodes = base.node_count(),
            links = base.link_count(),
            root = %root,
            "built base graph"
        );

        Ok(InteractionModel {
            engine: ExpansionEngine::new(base.clone()),
            clusters: ClusterMap::new(cfg.clone()),
            cfg,
            root,
            store,
            base,
            depths,
            observer: None,
        })
    }

    // -----------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------

    /// Checks the expansion preconditions for `id` without mutating
    /// anything.
    pub fn can_expand(&self, id: &ProteinId) -> Result<(), GraphError> {
        if !self.store.contains_node(id) {
            return Err(GraphError::UnknownProtein { id: id.clone() });
        }
        let depth = self.depth(id);
        if depth >= self.cfg.max_depth {
            return Err(GraphError::DepthLimitExceeded {
                id: id.clone(),
                depth,
                max: self.cfg.max_depth,
            });
        }
        Ok(())
    }

    /// Fetches the subgraph for `owner` through `source` and merges it.
    ///
    /// Returns `Ok(None)` when the backend reported the subgraph as
    /// still being computed; the caller retries later.
    pub fn expand_with(
        &mut self,
        owner: &ProteinId,
        source: &mut dyn SubgraphSource,
    ) -> Result<Option<MergeReport>, GraphError> {
        self.can_expand(owner)?;
        let visible: Vec<ProteinId> = self.store.node_ids().cloned().collect();
        match source.fetch(owner, &visible)? {
            FetchOutcome::Ready(payload) => self.merge_expansion(owner, payload).map(Some),
            FetchOutcome::Pending => Ok(None),
        }
    }

    /// Merges a fetched subgraph into the graph as `owner`'s expansion.
    ///
    /// New proteins are placed on a ring inside a cluster anchored at
    /// the owner; links are deduplicated against the live graph, the
    /// base snapshot, and mirror reports within the payload; targets of
    /// mediated chains are re-homed around their mediator. Every
    /// element the expansion relies on -- created or already present --
    /// is registered with the expansion engine so a later collapse
    /// releases exactly this owner's share.
    pub fn merge_expansion(
        &mut self,
        owner: &ProteinId,
        payload: SubgraphPayload,
    ) -> Result<MergeReport, GraphError> {
        self.can_expand(owner)?;
        let owner_depth = self.depth(owner);

        let fresh: IndexSet<ProteinId> = payload
            .proteins
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(ProteinId::from)
            .filter(|id| id != owner && !self.store.contains_node(id))
            .collect();

        // A cluster from a previous (still live) expansion keeps its
        // geometry; otherwise claim the next spiral slot.
        let existing = self.clusters.cluster(owner).map(|c| (c.center, c.radius));
        let (center, radius) = match existing {
            Some(geometry) => geometry,
            None => {
                // Sized by the payload's protein count minus the owner,
                // even when some of those proteins are already present.
                let hint = payload.proteins.len().saturating_sub(1);
                (self.clusters.allocate_center(hint), self.clusters.cluster_radius(hint))
            }
        };

        let depth = self.cfg.max_depth.min(owner_depth + 1);
        let ring_radius = self.cfg.member_ring_fraction * radius;
        for (i, id) in fresh.iter().enumerate() {
            let position = ring_point(center, ring_radius, i, fresh.len());
            self.store
                .add_node(Node::interactor(id.clone(), position, self.cfg.node_radius));
            self.depths.insert(id.clone(), depth);
        }

        let mut pending: IndexSet<LinkId> = IndexSet::new();
        let mut added_links: Vec<LinkId> = Vec::new();
        let mut reused_links = 0usize;
        let mut mediated: Vec<(ProteinId, ProteinId)> = Vec::new();

        for raw in payload.interactions {
            let effect = EffectKind::classify(&raw.arrow, &raw.intent);
            let (source, target) = raw.endpoints();
            let id = LinkId::new(source.clone(), target.clone(), effect);

            // Base elements are permanent; they are never registered to
            // an expansion, in either direction.
            if self.base.contains_link(&id) || self.base.contains_link(&id.reversed()) {
                continue;
            }
            if pending.contains(&id) {
                continue;
            }
            let reversed = id.reversed();
            if pending.contains(&reversed) {
                // Mirror report within the same payload: one link,
                // rendered both ways.
                if let Some(link) = self.store.link_mut(&reversed) {
                    link.bidirectional = true;
                }
                continue;
            }
            if self.store.contains_link(&id) {
                // Created by some other expansion; this owner now
                // relies on it too.
                pending.insert(id);
                reused_links += 1;
                continue;
            }
            if !self.store.contains_node(&source) || !self.store.contains_node(&target) {
                debug!("dropping interaction with unknown endpoint: {source} / {target}");
                continue;
            }
            if raw.kind == InteractionKind::Indirect {
                if let Some(mediator) = raw.upstream.as_deref() {
                    mediated.push((ProteinId::from(mediator), target.clone()));
                }
            }
            self.store.add_link(Link::from_raw(raw, effect));
            added_links.push(id.clone());
            pending.insert(id);
        }

        self.rehome_mediated(&mediated, &fresh, center);

        if !self.clusters.contains(owner) {
            self.clusters.create_cluster(owner, center, radius);
            // The anchor holds still while its cluster settles around
            // it.
            if let Some(node) = self.store.node_mut(owner) {
                node.fixed = true;
            }
        }
        for id in &fresh {
            self.clusters.add_member(owner, id.clone());
        }
        let scope: IndexSet<&ProteinId> = fresh.iter().chain(std::iter::once(owner)).collect();
        for link_id in &pending {
            if scope.contains(&link_id.source) && scope.contains(&link_id.target) {
                self.clusters.mark_local_link(owner, link_id.clone());
            }
        }

        let added_nodes: Vec<ProteinId> = fresh.into_iter().collect();
        self.engine
            .record_expansion(owner, added_nodes.iter().cloned(), pending.iter().cloned());

        info!(
            owner = %owner,
            nodes = added_nodes.len(),
            links = added_links.len(),
            reused = reused_links,
            "merged expansion"
        );
        self.notify(GraphChange::Merged {
            owner: owner.clone(),
            added_nodes: added_nodes.clone(),
            added_links: added_links.clone(),
        });

        Ok(MergeReport {
            owner: owner.clone(),
            added_nodes,
            added_links,
            reused_links,
        })
    }

    /// Moves targets of mediated chains next to their mediator, on a
    /// small orbit. Only nodes this merge introduced are moved.
    fn rehome_mediated(
        &mut self,
        mediated: &[(ProteinId, ProteinId)],
        fresh: &IndexSet<ProteinId>,
        fallback: (f64, f64),
    ) {
        let mut orbits: IndexMap<ProteinId, Vec<ProteinId>> = IndexMap::new();
        for (mediator, target) in mediated {
            if fresh.contains(target) {
                orbits.entry(mediator.clone()).or_default().push(target.clone());
            }
        }
        for (mediator, targets) in orbits {
            let anchor = match self.store.node(&mediator) {
                Some(node) => (node.x, node.y),
                None => {
                    warn!("mediator {mediator} not in graph; orbiting around cluster center");
                    fallback
                }
            };
            let count = targets.len();
            for (i, target) in targets.into_iter().enumerate() {
                let position = ring_point(anchor, self.cfg.orbit_radius, i, count);
                if let Some(node) = self.store.node_mut(&target) {
                    node.x = position.0;
                    node.y = position.1;
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Collapse
    // -----------------------------------------------------------------

    /// Collapses `owner`'s expansion. Returns `None` when the owner is
    /// not expanded (a no-op).
    pub fn collapse(&mut self, owner: &ProteinId) -> Option<CollapseOutcome> {
        let outcome = self.engine.collapse(owner, &mut self.store)?;
        self.clusters.forget_nodes(&outcome.removed_nodes);
        self.clusters.forget_links(&outcome.removed_links);
        self.clusters.remove_cluster(owner);
        for id in &outcome.removed_nodes {
            self.depths.shift_remove(id);
        }
        if let Some(node) = self.store.node_mut(owner) {
            if !node.is_main() {
                node.fixed = false;
            }
        }
        info!(
            owner = %owner,
            nodes = outcome.removed_nodes.len(),
            links = outcome.removed_links.len(),
            "collapsed expansion"
        );
        self.notify(GraphChange::Collapsed {
            owner: owner.clone(),
            removed_nodes: outcome.removed_nodes.clone(),
            removed_links: outcome.removed_links.clone(),
        });
        Some(outcome)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn root(&self) -> &ProteinId {
        &self.root
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// BFS depth of a protein; proteins without a recorded depth count
    /// as depth 0.
    pub fn depth(&self, id: &ProteinId) -> u32 {
        self.depths.get(id).copied().unwrap_or(0)
    }

    pub fn expansion_state(&self, id: &ProteinId) -> ExpansionState {
        self.engine.state(id)
    }

    pub fn node(&self, id: &ProteinId) -> Option<&Node> {
        self.store.node(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.store.nodes()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.store.links()
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.store.link_count()
    }

    pub fn cluster(&self, owner: &ProteinId) -> Option<&Cluster> {
        self.clusters.cluster(owner)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    /// All links internal to some live cluster, for layouts that treat
    /// intra-cluster edges with a shorter rest length.
    pub fn intra_cluster_links(&self) -> Vec<&Link> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.local_links.iter())
            .filter_map(|id| self.store.link(id))
            .collect()
    }

    // -----------------------------------------------------------------
    // Layout hooks
    // -----------------------------------------------------------------

    /// Writes a position computed by the external layout simulator.
    pub fn apply_position(&mut self, id: &ProteinId, x: f64, y: f64) {
        if let Some(node) = self.store.node_mut(id) {
            node.x = x;
            node.y = y;
        }
    }

    /// Pins a node against the layout (drag start).
    pub fn pin_node(&mut self, id: &ProteinId) {
        if let Some(node) = self.store.node_mut(id) {
            node.fixed = true;
        }
    }

    /// Releases a pinned node (drag end). The main node and cluster
    /// anchors stay pinned.
    pub fn release_node(&mut self, id: &ProteinId) {
        if self.clusters.contains(id) {
            return;
        }
        if let Some(node) = self.store.node_mut(id) {
            if !node.is_main() {
                node.fixed = false;
            }
        }
    }

    // -----------------------------------------------------------------
    // Observation and export
    // -----------------------------------------------------------------

    /// Installs the change observer. At most one observer is active.
    pub fn set_observer(&mut self, observer: ChangeObserver) {
        self.observer = Some(observer);
    }

    fn notify(&mut self, change: GraphChange) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&change);
        }
    }

    /// Captures a serializable snapshot of the current model state.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            root: self.root.clone(),
            nodes: self.store.nodes().cloned().collect(),
            links: self.store.links().cloned().collect(),
            depths: self.depths.clone(),
            clusters: self.clusters.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::RawInteraction;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn base_payload() -> NetworkPayload {
        NetworkPayload {
            main: "P1".to_owned(),
            proteins: vec!["P1".to_owned(), "P2".to_owned(), "P3".to_owned()],
            interactions: vec![
                RawInteraction::new("P1", "P2", "activates"),
                RawInteraction::new("P2", "P3", "binds"),
            ],
        }
    }

    fn model() -> InteractionModel {
        InteractionModel::build(base_payload(), ModelConfig::default()).unwrap()
    }

    // The owner appears in its own protein list, as fetched payloads
    // do; the merge must skip it.
    fn p2_payload() -> SubgraphPayload {
        SubgraphPayload {
            proteins: vec!["P2".to_owned(), "P4".to_owned()],
            interactions: vec![RawInteraction::new("P2", "P4", "inhibits")],
        }
    }

    #[test]
    fn build_pins_main_and_assigns_depths() {
        let m = model();
        let main = m.node(&"P1".into()).unwrap();
        assert!(main.fixed);
        assert_eq!((main.x, main.y), ModelConfig::default().center);
        assert_eq!(m.depth(&"P1".into()), 0);
        assert_eq!(m.depth(&"P2".into()), 1);
        assert_eq!(m.depth(&"P3".into()), 2);
        assert_eq!(m.node_count(), 3);
        assert_eq!(m.link_count(), 2);
    }

    #[test]
    fn build_is_reproducible() {
        let a = model();
        let b = model();
        for node in a.nodes() {
            let other = b.node(&node.id).unwrap();
            assert_eq!((node.x, node.y), (other.x, other.y));
        }
    }

    #[test]
    fn build_rejects_missing_root_and_empty_network() {
        let mut payload = base_payload();
        payload.main = "  ".to_owned();
        assert!(matches!(
            InteractionModel::build(payload, ModelConfig::default()),
            Err(GraphError::MissingRoot)
        ));

        let mut payload = base_payload();
        payload.proteins.clear();
        assert!(matches!(
            InteractionModel::build(payload, ModelConfig::default()),
            Err(GraphError::EmptyNetwork)
        ));
    }

    #[test]
    fn build_drops_links_with_unknown_endpoints() {
        let mut payload = base_payload();
        payload
            .interactions
            .push(RawInteraction::new("P1", "GHOST", "binds"));
        let m = InteractionModel::build(payload, ModelConfig::default()).unwrap();
        assert_eq!(m.link_count(), 2);
    }

    #[test]
    fn expand_and_collapse_scenario() {
        let mut m = model();

        let report = m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        assert_eq!(report.added_nodes, vec![ProteinId::from("P4")]);
        assert_eq!(report.added_links.len(), 1);
        assert_eq!(m.node_count(), 4);
        assert_eq!(m.link_count(), 3);
        assert_eq!(m.depth(&"P4".into()), 2);
        assert_eq!(m.expansion_state(&"P2".into()), ExpansionState::Expanded);

        // The owner anchors its cluster, pinned; P4 is its one member
        // and the new link is cluster-local.
        assert!(m.node(&"P2".into()).unwrap().fixed);
        let cluster = m.cluster(&"P2".into()).unwrap();
        assert_eq!(cluster.members.len(), 1);
        assert!(cluster.members.contains(&ProteinId::from("P4")));
        assert_eq!(cluster.local_links.len(), 1);
        assert_eq!(m.intra_cluster_links().len(), 1);

        let outcome = m.collapse(&"P2".into()).unwrap();
        assert_eq!(outcome.removed_nodes, vec![ProteinId::from("P4")]);
        assert_eq!(m.node_count(), 3);
        assert_eq!(m.link_count(), 2);
        assert!(m.cluster(&"P2".into()).is_none());
        assert!(!m.node(&"P2".into()).unwrap().fixed);
        assert_eq!(m.expansion_state(&"P2".into()), ExpansionState::Collapsed);
        assert_eq!(m.depth(&"P4".into()), 0); // no recorded depth
    }

    #[test]
    fn merge_is_idempotent() {
        let mut m = model();
        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        let again = m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        assert!(again.added_nodes.is_empty());
        assert!(again.added_links.is_empty());
        assert_eq!(again.reused_links, 1);
        assert_eq!(m.node_count(), 4);
        assert_eq!(m.link_count(), 3);

        // One collapse undoes both merges.
        m.collapse(&"P2".into()).unwrap();
        assert_eq!(m.node_count(), 3);
        assert_eq!(m.link_count(), 2);
    }

    #[test]
    fn collapse_then_expand_round_trip_uses_a_fresh_center() {
        let mut m = model();
        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        let first_center = m.cluster(&"P2".into()).unwrap().center;
        m.collapse(&"P2".into()).unwrap();

        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        assert_eq!(m.node_count(), 4);
        assert!(m.node(&"P4".into()).is_some());
        let second_center = m.cluster(&"P2".into()).unwrap().center;
        assert_ne!(first_center, second_center);
    }

    #[test]
    fn cluster_size_hint_counts_all_payload_proteins_except_the_owner() {
        let mut m = model();
        // P3 is already in the graph; the radius is still sized by the
        // full payload list minus the owner.
        let mut proteins = vec!["P2".to_owned(), "P3".to_owned()];
        proteins.extend((1..=7).map(|i| format!("N{i}")));
        let payload = SubgraphPayload {
            proteins,
            interactions: vec![],
        };
        m.merge_expansion(&"P2".into(), payload).unwrap();
        let cluster = m.cluster(&"P2".into()).unwrap();
        let expected = ModelConfig::default().cluster_radius_scale * 8f64.sqrt();
        assert!((cluster.radius - expected).abs() < 1e-9);
        assert_eq!(cluster.members.len(), 7);
    }

    #[test]
    fn base_links_reported_again_are_never_registered() {
        let mut m = model();
        // The payload repeats a base interaction, also mirrored.
        let payload = SubgraphPayload {
            proteins: vec!["P4".to_owned()],
            interactions: vec![
                RawInteraction::new("P1", "P2", "activates"),
                RawInteraction::new("P2", "P1", "activates"),
                RawInteraction::new("P4", "P2", "inhibits"),
            ],
        };
        m.merge_expansion(&"P2".into(), payload).unwrap();
        m.collapse(&"P2".into()).unwrap();
        assert_eq!(m.link_count(), 2);
        assert!(m
            .links()
            .any(|l| l.id == LinkId::new("P1".into(), "P2".into(), EffectKind::Activates)));
    }

    #[test]
    fn mirror_reports_within_a_payload_collapse_to_one_bidirectional_link() {
        let mut m = model();
        let payload = SubgraphPayload {
            proteins: vec!["P4".to_owned()],
            interactions: vec![
                RawInteraction::new("P2", "P4", "binds"),
                RawInteraction::new("P4", "P2", "binds"),
            ],
        };
        let report = m.merge_expansion(&"P2".into(), payload).unwrap();
        assert_eq!(report.added_links.len(), 1);
        let id = LinkId::new("P2".into(), "P4".into(), EffectKind::Binds);
        assert!(m.links().any(|l| l.id == id && l.bidirectional));
    }

    #[test]
    fn shared_link_between_two_expansions_survives_one_collapse() {
        let mut m = model();
        let shared = SubgraphPayload {
            proteins: vec!["P4".to_owned()],
            interactions: vec![RawInteraction::new("P2", "P4", "binds")],
        };
        m.merge_expansion(&"P2".into(), shared.clone()).unwrap();
        // P3's expansion reports the same, already-live link.
        let report = m.merge_expansion(&"P3".into(), shared).unwrap();
        assert_eq!(report.reused_links, 1);
        assert!(report.added_links.is_empty());

        m.collapse(&"P2".into()).unwrap();
        let id = LinkId::new("P2".into(), "P4".into(), EffectKind::Binds);
        assert!(m.links().any(|l| l.id == id));
        assert!(m.node(&"P4".into()).is_some());

        m.collapse(&"P3".into()).unwrap();
        assert!(!m.links().any(|l| l.id == id));
        assert!(m.node(&"P4".into()).is_none());
    }

    #[test]
    fn mediated_targets_orbit_their_mediator() {
        let mut m = model();
        let payload = SubgraphPayload {
            proteins: vec!["P4".to_owned(), "P5".to_owned()],
            interactions: vec![
                RawInteraction::new("P2", "P4", "binds"),
                RawInteraction::new("P2", "P5", "activates")
                    .with_kind(InteractionKind::Indirect)
                    .with_upstream("P4"),
            ],
        };
        m.merge_expansion(&"P2".into(), payload).unwrap();
        let mediator = m.node(&"P4".into()).unwrap();
        let target = m.node(&"P5".into()).unwrap();
        let d = (target.x - mediator.x).hypot(target.y - mediator.y);
        assert!((d - ModelConfig::default().orbit_radius).abs() < 1e-9);
    }

    #[test]
    fn missing_mediator_falls_back_to_the_cluster_center() {
        let mut m = model();
        // The mediator named by the chain was never part of any
        // payload; placement must not panic and must orbit the cluster
        // center instead.
        let payload = SubgraphPayload {
            proteins: vec!["P5".to_owned()],
            interactions: vec![RawInteraction::new("P2", "P5", "activates")
                .with_kind(InteractionKind::Indirect)
                .with_upstream("GHOST")],
        };
        m.merge_expansion(&"P2".into(), payload).unwrap();
        let center = m.cluster(&"P2".into()).unwrap().center;
        let target = m.node(&"P5".into()).unwrap();
        let d = (target.x - center.0).hypot(target.y - center.1);
        assert!((d - ModelConfig::default().orbit_radius).abs() < 1e-9);
    }

    #[test]
    fn depth_gate_blocks_expansion_at_the_limit() {
        let cfg = ModelConfig {
            max_depth: 1,
            ..ModelConfig::default()
        };
        let mut m = InteractionModel::build(base_payload(), cfg).unwrap();
        assert!(matches!(
            m.merge_expansion(&"P2".into(), p2_payload()),
            Err(GraphError::DepthLimitExceeded { depth: 1, max: 1, .. })
        ));
        assert_eq!(m.node_count(), 3);
    }

    #[test]
    fn unknown_owner_is_rejected() {
        let mut m = model();
        assert!(matches!(
            m.merge_expansion(&"GHOST".into(), p2_payload()),
            Err(GraphError::UnknownProtein { .. })
        ));
    }

    #[test]
    fn new_node_depth_is_capped_at_max_depth() {
        let mut m = model();
        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        // P4 is at depth 2; expanding it adds depth-3 nodes, the cap.
        let payload = SubgraphPayload {
            proteins: vec!["P6".to_owned()],
            interactions: vec![RawInteraction::new("P4", "P6", "binds")],
        };
        m.merge_expansion(&"P4".into(), payload).unwrap();
        assert_eq!(m.depth(&"P6".into()), 3);
        assert!(m.can_expand(&"P6".into()).is_err());
    }

    #[test]
    fn observer_sees_merges_and_collapses() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut m = model();
        m.set_observer(Box::new(move |change| {
            let tag = match change {
                GraphChange::Merged { owner, .. } => format!("merge:{owner}"),
                GraphChange::Collapsed { owner, .. } => format!("collapse:{owner}"),
            };
            sink.borrow_mut().push(tag);
        }));
        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        m.collapse(&"P2".into()).unwrap();
        assert_eq!(*seen.borrow(), vec!["merge:P2", "collapse:P2"]);
    }

    #[test]
    fn expand_with_pending_source_changes_nothing() {
        struct PendingSource;
        impl SubgraphSource for PendingSource {
            fn fetch(
                &mut self,
                _owner: &ProteinId,
                _visible: &[ProteinId],
            ) -> Result<FetchOutcome, GraphError> {
                Ok(FetchOutcome::Pending)
            }
        }
        let mut m = model();
        let report = m.expand_with(&"P2".into(), &mut PendingSource).unwrap();
        assert!(report.is_none());
        assert_eq!(m.node_count(), 3);
        assert_eq!(m.expansion_state(&"P2".into()), ExpansionState::Collapsed);
    }

    #[test]
    fn expand_with_ready_source_merges() {
        struct ReadySource;
        impl SubgraphSource for ReadySource {
            fn fetch(
                &mut self,
                _owner: &ProteinId,
                visible: &[ProteinId],
            ) -> Result<FetchOutcome, GraphError> {
                assert!(visible.contains(&"P1".into()));
                Ok(FetchOutcome::Ready(SubgraphPayload {
                    proteins: vec!["P4".to_owned()],
                    interactions: vec![RawInteraction::new("P4", "P2", "inhibits")],
                }))
            }
        }
        let mut m = model();
        let report = m.expand_with(&"P2".into(), &mut ReadySource).unwrap().unwrap();
        assert_eq!(report.added_nodes.len(), 1);
        assert_eq!(m.node_count(), 4);
    }

    #[test]
    fn snapshot_serializes() {
        let mut m = model();
        m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
        let snapshot = m.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["root"], "P1");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["clusters"].as_array().unwrap().len(), 1);
    }

    proptest! {
        /// Merging the same payload any number of times and collapsing
        /// once always restores the base graph.
        #[test]
        fn repeated_merges_collapse_to_base(repeats in 1usize..5) {
            let mut m = model();
            for _ in 0..repeats {
                m.merge_expansion(&"P2".into(), p2_payload()).unwrap();
            }
            m.collapse(&"P2".into()).unwrap();
            prop_assert_eq!(m.node_count(), 3);
            prop_assert_eq!(m.link_count(), 2);
        }
    }
}
