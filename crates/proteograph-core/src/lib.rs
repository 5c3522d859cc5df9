//! proteograph-core: incremental graph-state engine for interactive
//! protein-interaction networks.
//!
//! The engine tracks a live node/link graph that grows as the user
//! expands protein neighborhoods and shrinks as they collapse them.
//! Server-fetched subgraphs are merged into the existing graph without
//! duplicating shared elements; reference counting over expansion
//! provenance makes collapse safe when two expansions introduced the
//! same neighbor or cross-link. Spatial cluster placement assigns
//! initial coordinates consumed by an external force simulator -- this
//! crate never draws anything and never runs physics.
//!
//! [`InteractionModel`] is the single entry point: it owns the
//! [`GraphStore`], the depth map, the [`ExpansionEngine`], and the
//! [`ClusterMap`], and exposes the merge/collapse operations plus
//! read-only views for the renderer and the layout simulator.

pub mod cluster;
pub mod config;
pub mod depth;
pub mod effect;
pub mod error;
pub mod expansion;
pub mod id;
pub mod interaction;
pub mod link;
pub mod model;
pub mod node;
pub mod store;

// Re-export commonly used types
pub use cluster::{Cluster, ClusterMap};
pub use config::ModelConfig;
pub use depth::compute_depths;
pub use effect::EffectKind;
pub use error::GraphError;
pub use expansion::{CollapseOutcome, ExpansionEngine, ExpansionState};
pub use id::{ElementRef, LinkId, ProteinId};
pub use interaction::{
    FetchOutcome, InteractionKind, NetworkPayload, RawInteraction, SubgraphPayload,
    SubgraphSource,
};
pub use link::Link;
pub use model::{GraphChange, InteractionModel, MergeReport, ModelSnapshot};
pub use node::{Node, NodeKind};
pub use store::{BaseSnapshot, GraphStore};
