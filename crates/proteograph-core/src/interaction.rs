//! Raw interaction records and the payload types exchanged with the
//! subgraph fetch service.
//!
//! Upstream payloads are produced by a free-text discovery pipeline, so
//! every field beyond the endpoints is optional and unrecognized fields
//! are carried through losslessly in [`RawInteraction::extra`]. Payload
//! validation is deliberately permissive at the record level (bad
//! records are dropped, not fatal) but strict at the envelope level: a
//! payload missing either top-level array is rejected before any graph
//! state is touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::GraphError;
use crate::id::ProteinId;

/// How an interaction relates to the protein the user queried.
///
/// `Indirect` interactions are mediated by an upstream protein (the
/// chain `main -> mediator -> target` surfaced as one record); `Shared`
/// interactions are cross-links between two non-root interactors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    #[default]
    Direct,
    Indirect,
    Shared,
}

/// One interaction record as reported by the discovery pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInteraction {
    /// Source protein of the reported effect.
    pub source: String,
    /// Target protein. Pipeline output historically calls this field
    /// `primary`.
    #[serde(alias = "primary")]
    pub target: String,
    /// Free-text arrow label ("activates", "represses", ...).
    #[serde(default)]
    pub arrow: String,
    /// Secondary free-text label consulted when the arrow is
    /// uninformative.
    #[serde(default, alias = "effect")]
    pub intent: String,
    /// Declared direction, when present ("bidirectional", "both", ...).
    #[serde(default)]
    pub direction: Option<String>,
    /// Direct, indirect (mediated), or shared cross-link.
    #[serde(default, rename = "interaction_type")]
    pub kind: InteractionKind,
    /// Mediator protein for indirect chains.
    #[serde(default, rename = "upstream_interactor")]
    pub upstream: Option<String>,
    /// Everything else the pipeline attached (functions, evidence,
    /// provenance). Passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawInteraction {
    /// Creates a minimal record; the remaining fields default to empty.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        arrow: impl Into<String>,
    ) -> Self {
        RawInteraction {
            source: source.into(),
            target: target.into(),
            arrow: arrow.into(),
            intent: String::new(),
            direction: None,
            kind: InteractionKind::Direct,
            upstream: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the interaction kind (builder style, mainly for tests).
    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the mediator protein for an indirect chain.
    pub fn with_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.upstream = Some(upstream.into());
        self
    }

    /// Marks the declared direction as bidirectional.
    pub fn bidirectional(mut self) -> Self {
        self.direction = Some("bidirectional".to_owned());
        self
    }

    /// Returns `true` when the declared direction says the effect runs
    /// both ways.
    pub fn is_bidirectional(&self) -> bool {
        self.direction
            .as_deref()
            .map(|d| {
                let d = d.trim().to_ascii_lowercase();
                d == "bidirectional" || d == "both"
            })
            .unwrap_or(false)
    }

    /// Endpoints as typed protein ids.
    pub fn endpoints(&self) -> (ProteinId, ProteinId) {
        (
            ProteinId::from(self.source.as_str()),
            ProteinId::from(self.target.as_str()),
        )
    }
}

/// A fetched subgraph: the proteins involved and the interactions among
/// them, as returned for one expansion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubgraphPayload {
    pub proteins: Vec<String>,
    pub interactions: Vec<RawInteraction>,
}

impl SubgraphPayload {
    /// Validates and extracts a payload from untyped JSON.
    ///
    /// The envelope must carry both a `proteins` array and an
    /// `interactions` array; otherwise the whole payload is rejected
    /// (the caller aborts the merge without mutating state). Individual
    /// records that fail to parse are dropped with a warning.
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        let obj = value.as_object().ok_or_else(|| GraphError::MalformedPayload {
            reason: "payload is not a JSON object".to_owned(),
        })?;
        let proteins_raw = obj
            .get("proteins")
            .and_then(Value::as_array)
            .ok_or_else(|| GraphError::MalformedPayload {
                reason: "missing `proteins` array".to_owned(),
            })?;
        let interactions_raw = obj
            .get("interactions")
            .and_then(Value::as_array)
            .ok_or_else(|| GraphError::MalformedPayload {
                reason: "missing `interactions` array".to_owned(),
            })?;

        let proteins = proteins_raw
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();

        let mut interactions = Vec::with_capacity(interactions_raw.len());
        for record in interactions_raw {
            match serde_json::from_value::<RawInteraction>(record.clone()) {
                Ok(interaction) => interactions.push(interaction),
                Err(err) => warn!("dropping malformed interaction record: {err}"),
            }
        }

        Ok(SubgraphPayload {
            proteins,
            interactions,
        })
    }
}

/// The full network payload used for initial graph construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPayload {
    /// The queried (root) protein.
    pub main: String,
    pub proteins: Vec<String>,
    pub interactions: Vec<RawInteraction>,
}

/// Result of asking the fetch service for an expansion subgraph.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The subgraph is fully resolved and ready to merge.
    Ready(SubgraphPayload),
    /// A longer-running backend computation must finish first; the
    /// caller should retry later.
    Pending,
}

/// Injectable seam for the subgraph fetch service.
///
/// The engine never talks to the network itself; callers supply an
/// implementation (HTTP client, cache, test stub) and drive the merge
/// with the returned payloads.
pub trait SubgraphSource {
    /// Requests the expansion subgraph for `owner`, given the proteins
    /// currently visible in the graph.
    fn fetch(
        &mut self,
        owner: &ProteinId,
        visible: &[ProteinId],
    ) -> Result<FetchOutcome, GraphError>;
}
