//! Cluster bookkeeping and placement geometry.
//!
//! Each expansion anchors a cluster: a center allocated on an outward
//! golden-angle spiral around the viewport center, a radius grown with
//! the square root of the member count, and the set of member proteins
//! plus the links internal to the cluster. A reverse index maps each
//! member to its owning cluster; proteins absent from the index belong
//! to the implicit root cluster around the main node.

use std::collections::HashMap;
use std::f64::consts::TAU;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::config::ModelConfig;
use crate::id::{LinkId, ProteinId};

/// Golden angle in radians. Successive spiral slots never stack on the
/// same bearing.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// One expansion's cluster: its anchor, placement circle, and contents.
///
/// The owner anchors the cluster but is not a member -- it keeps the
/// position it already had.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub owner: ProteinId,
    pub center: (f64, f64),
    pub radius: f64,
    pub members: IndexSet<ProteinId>,
    pub local_links: IndexSet<LinkId>,
}

/// All live clusters plus the member-to-cluster reverse index.
#[derive(Debug)]
pub struct ClusterMap {
    clusters: IndexMap<ProteinId, Cluster>,
    node_cluster: HashMap<ProteinId, ProteinId>,
    /// Monotonic spiral slot counter; never reused, so re-expanding
    /// after a collapse lands on a fresh center.
    cursor: usize,
    cfg: ModelConfig,
}

impl ClusterMap {
    pub fn new(cfg: ModelConfig) -> Self {
        ClusterMap {
            clusters: IndexMap::new(),
            node_cluster: HashMap::new(),
            cursor: 0,
            cfg,
        }
    }

    /// Radius for a cluster holding `count` members. Grows with
    /// sqrt(count) above a fixed floor so small clusters stay readable.
    pub fn cluster_radius(&self, count: usize) -> f64 {
        let grown = self.cfg.cluster_radius_scale * (count as f64).sqrt();
        self.cfg.cluster_radius_floor.max(grown)
    }

    /// Allocates the next spiral center, biased outward by the expected
    /// cluster size so large clusters start with more clearance.
    pub fn allocate_center(&mut self, expected_members: usize) -> (f64, f64) {
        let slot = self.cursor;
        self.cursor += 1;
        let angle = slot as f64 * GOLDEN_ANGLE;
        let distance = self.cfg.spiral_base
            + self.cfg.spiral_step * slot as f64
            + self.cluster_radius(expected_members) * 0.25;
        (
            self.cfg.center.0 + distance * angle.cos(),
            self.cfg.center.1 + distance * angle.sin(),
        )
    }

    /// Registers a new cluster anchored at `owner`.
    ///
    /// The owner stops being a member of whichever cluster held it; it
    /// now anchors its own.
    pub fn create_cluster(&mut self, owner: &ProteinId, center: (f64, f64), radius: f64) {
        if let Some(home) = self.node_cluster.remove(owner) {
            if let Some(cluster) = self.clusters.get_mut(&home) {
                cluster.members.shift_remove(owner);
            }
        }
        self.clusters.insert(
            owner.clone(),
            Cluster {
                owner: owner.clone(),
                center,
                radius,
                members: IndexSet::new(),
                local_links: IndexSet::new(),
            },
        );
    }

    /// Adds `member` to the cluster anchored at `owner`, moving it out
    /// of any cluster that previously held it.
    pub fn add_member(&mut self, owner: &ProteinId, member: ProteinId) {
        if let Some(previous) = self.node_cluster.get(&member) {
            if previous == owner {
                return;
            }
            let previous = previous.clone();
            if let Some(cluster) = self.clusters.get_mut(&previous) {
                cluster.members.shift_remove(&member);
            }
        }
        if let Some(cluster) = self.clusters.get_mut(owner) {
            cluster.members.insert(member.clone());
            self.node_cluster.insert(member, owner.clone());
        }
    }

    /// Records a link as internal to `owner`'s cluster.
    pub fn mark_local_link(&mut self, owner: &ProteinId, link: LinkId) {
        if let Some(cluster) = self.clusters.get_mut(owner) {
            cluster.local_links.insert(link);
        }
    }

    /// Drops `owner`'s cluster. Surviving members fall back to the
    /// implicit root cluster.
    pub fn remove_cluster(&mut self, owner: &ProteinId) -> Option<Cluster> {
        let cluster = self.clusters.shift_remove(owner)?;
        for member in &cluster.members {
            if self.node_cluster.get(member) == Some(owner) {
                self.node_cluster.remove(member);
            }
        }
        Some(cluster)
    }

    /// Forgets removed nodes from the reverse index and from cluster
    /// membership.
    pub fn forget_nodes(&mut self, ids: &[ProteinId]) {
        for id in ids {
            if let Some(home) = self.node_cluster.remove(id) {
                if let Some(cluster) = self.clusters.get_mut(&home) {
                    cluster.members.shift_remove(id);
                }
            }
        }
    }

    /// Forgets removed links from every surviving cluster's local-link
    /// set, so no cluster ever names a link the store no longer holds.
    pub fn forget_links(&mut self, ids: &[LinkId]) {
        if ids.is_empty() {
            return;
        }
        for cluster in self.clusters.values_mut() {
            for id in ids {
                cluster.local_links.shift_remove(id);
            }
        }
    }

    pub fn cluster(&self, owner: &ProteinId) -> Option<&Cluster> {
        self.clusters.get(owner)
    }

    /// The cluster a protein is a member of, if any.
    pub fn home_of(&self, id: &ProteinId) -> Option<&ProteinId> {
        self.node_cluster.get(id)
    }

    pub fn contains(&self, owner: &ProteinId) -> bool {
        self.clusters.contains_key(owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }
}

/// The `index`-th of `count` evenly spaced points on a circle.
pub fn ring_point(center: (f64, f64), radius: f64, index: usize, count: usize) -> (f64, f64) {
    let count = count.max(1);
    let angle = TAU * index as f64 / count as f64;
    (
        center.0 + radius * angle.cos(),
        center.1 + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> ClusterMap {
        ClusterMap::new(ModelConfig::default())
    }

    #[test]
    fn center_allocation_is_deterministic_and_distinct() {
        let mut a = map();
        let mut b = map();
        let first_a = a.allocate_center(4);
        let first_b = b.allocate_center(4);
        assert_eq!(first_a, first_b);

        let second_a = a.allocate_center(4);
        assert_ne!(first_a, second_a);
        // Later slots sit farther out.
        let cfg = ModelConfig::default();
        let dist = |p: (f64, f64)| ((p.0 - cfg.center.0).hypot(p.1 - cfg.center.1));
        assert!(dist(second_a) > dist(first_a));
    }

    #[test]
    fn radius_has_a_floor_and_grows_with_members() {
        let m = map();
        let cfg = ModelConfig::default();
        assert_eq!(m.cluster_radius(0), cfg.cluster_radius_floor);
        assert_eq!(m.cluster_radius(1), cfg.cluster_radius_floor);
        assert!(m.cluster_radius(100) > m.cluster_radius(16));
        assert_eq!(m.cluster_radius(100), cfg.cluster_radius_scale * 10.0);
    }

    #[test]
    fn add_member_moves_between_clusters() {
        let mut m = map();
        m.create_cluster(&"P1".into(), (100.0, 0.0), 80.0);
        m.create_cluster(&"P2".into(), (-100.0, 0.0), 80.0);
        m.add_member(&"P1".into(), "X".into());
        assert_eq!(m.home_of(&"X".into()), Some(&"P1".into()));

        m.add_member(&"P2".into(), "X".into());
        assert_eq!(m.home_of(&"X".into()), Some(&"P2".into()));
        assert!(!m.cluster(&"P1".into()).unwrap().members.contains(&ProteinId::from("X")));
        assert!(m.cluster(&"P2".into()).unwrap().members.contains(&ProteinId::from("X")));
    }

    #[test]
    fn owner_leaves_old_cluster_when_anchoring_its_own() {
        let mut m = map();
        m.create_cluster(&"P1".into(), (100.0, 0.0), 80.0);
        m.add_member(&"P1".into(), "P2".into());

        m.create_cluster(&"P2".into(), (200.0, 0.0), 80.0);
        assert!(m.cluster(&"P1".into()).unwrap().members.is_empty());
        assert_eq!(m.home_of(&"P2".into()), None);
    }

    #[test]
    fn remove_cluster_releases_members_to_the_root() {
        let mut m = map();
        m.create_cluster(&"P2".into(), (100.0, 0.0), 80.0);
        m.add_member(&"P2".into(), "P4".into());
        let removed = m.remove_cluster(&"P2".into()).unwrap();
        assert_eq!(removed.members.len(), 1);
        assert_eq!(m.home_of(&"P4".into()), None);
        assert!(!m.contains(&"P2".into()));
    }

    #[test]
    fn forget_links_prunes_every_surviving_cluster() {
        use crate::effect::EffectKind;
        let mut m = map();
        m.create_cluster(&"P1".into(), (100.0, 0.0), 80.0);
        m.create_cluster(&"P2".into(), (-100.0, 0.0), 80.0);
        let id = LinkId::new("A".into(), "B".into(), EffectKind::Binds);
        m.mark_local_link(&"P1".into(), id.clone());
        m.mark_local_link(&"P2".into(), id.clone());

        m.forget_links(&[id]);
        assert!(m.cluster(&"P1".into()).unwrap().local_links.is_empty());
        assert!(m.cluster(&"P2".into()).unwrap().local_links.is_empty());
    }

    #[test]
    fn spiral_slots_are_never_reused() {
        let mut m = map();
        let first = m.allocate_center(2);
        m.create_cluster(&"P1".into(), first, 80.0);
        m.remove_cluster(&"P1".into());
        let second = m.allocate_center(2);
        assert_ne!(first, second);
    }

    #[test]
    fn ring_points_are_evenly_spaced_on_the_circle() {
        let center = (10.0, -5.0);
        let points: Vec<_> = (0..4).map(|i| ring_point(center, 50.0, i, 4)).collect();
        for p in &points {
            let d = (p.0 - center.0).hypot(p.1 - center.1);
            assert!((d - 50.0).abs() < 1e-9);
        }
        // First point sits on the positive x axis from the center.
        assert!((points[0].0 - 60.0).abs() < 1e-9);
        assert!((points[0].1 + 5.0).abs() < 1e-9);
    }
}
