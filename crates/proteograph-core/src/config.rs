//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable constants for graph construction and cluster placement.
///
/// The defaults are the production values; tests override `rng_seed`
/// or `max_depth` as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Viewport center; the main node is pinned here.
    pub center: (f64, f64),
    /// A protein may be expanded only while its depth is strictly
    /// below this limit.
    pub max_depth: u32,
    /// Half-width of the square jitter applied to interactor nodes at
    /// initial build.
    pub jitter_radius: f64,
    /// Render radius of the main node.
    pub main_radius: f64,
    /// Render radius of interactor nodes.
    pub node_radius: f64,
    /// Distance of the first cluster center from the viewport center.
    pub spiral_base: f64,
    /// Outward step per allocated cluster center.
    pub spiral_step: f64,
    /// Minimum cluster radius regardless of member count.
    pub cluster_radius_floor: f64,
    /// Cluster radius growth per sqrt(member count).
    pub cluster_radius_scale: f64,
    /// New members are ringed at this fraction of the cluster radius.
    pub member_ring_fraction: f64,
    /// Ring radius for targets of indirect/mediator chains, around the
    /// mediator.
    pub orbit_radius: f64,
    /// Seed for the build-time jitter RNG; fixed so builds are
    /// reproducible.
    pub rng_seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            center: (0.0, 0.0),
            max_depth: 3,
            jitter_radius: 40.0,
            main_radius: 26.0,
            node_radius: 14.0,
            spiral_base: 220.0,
            spiral_step: 70.0,
            cluster_radius_floor: 80.0,
            cluster_radius_scale: 30.0,
            member_ring_fraction: 0.6,
            orbit_radius: 45.0,
            rng_seed: 0x70726f74,
        }
    }
}
