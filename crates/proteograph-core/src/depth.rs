//! Breadth-first depth labeling from the root protein.
//!
//! Distances ignore all link metadata: every interaction is treated as
//! one undirected edge, because hop count -- not biological direction --
//! is what gates expansion. The map is recomputed from scratch whenever
//! the active interaction set changes; there is no incremental update.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::id::ProteinId;

/// Computes BFS hop counts from `root` over an undirected view of the
/// interaction list.
///
/// The root has depth 0 (even when it appears in no interaction).
/// First visit wins; proteins unreachable from the root are absent from
/// the result rather than assigned a sentinel distance.
pub fn compute_depths(
    interactions: &[(ProteinId, ProteinId)],
    root: &ProteinId,
) -> IndexMap<ProteinId, u32> {
    let mut graph: UnGraph<ProteinId, ()> = UnGraph::new_undirected();
    let mut index_of: IndexMap<ProteinId, NodeIndex> = IndexMap::new();

    let root_idx = *index_of
        .entry(root.clone())
        .or_insert_with(|| graph.add_node(root.clone()));

    for (a, b) in interactions {
        let a_idx = *index_of
            .entry(a.clone())
            .or_insert_with(|| graph.add_node(a.clone()));
        let b_idx = *index_of
            .entry(b.clone())
            .or_insert_with(|| graph.add_node(b.clone()));
        graph.add_edge(a_idx, b_idx, ());
    }

    let mut depths = IndexMap::new();
    depths.insert(root.clone(), 0u32);

    let mut seen: HashSet<NodeIndex> = HashSet::new();
    seen.insert(root_idx);

    let mut queue = VecDeque::new();
    queue.push_back((root_idx, 0u32));

    while let Some((idx, depth)) = queue.pop_front() {
        for neighbor in graph.neighbors(idx) {
            if seen.insert(neighbor) {
                depths.insert(graph[neighbor].clone(), depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    depths
}
