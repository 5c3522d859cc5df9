//! Error types for the graph engine.
//!
//! Uses `thiserror` for structured, matchable variants. Most bad input
//! is recovered locally (skipped records, no-op collapses); the
//! variants here cover the cases the caller must be told about --
//! rejected payloads, missing proteins, and the expansion depth gate.

use thiserror::Error;

use crate::id::ProteinId;

/// Errors produced by the proteograph-core crate.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The network payload named no root protein.
    #[error("network payload has no root protein")]
    MissingRoot,

    /// The network payload contained no proteins at all.
    #[error("network payload contains no proteins")]
    EmptyNetwork,

    /// A subgraph payload was structurally unusable and the merge was
    /// aborted before touching any state.
    #[error("malformed subgraph payload: {reason}")]
    MalformedPayload { reason: String },

    /// An operation referenced a protein the graph does not contain.
    #[error("unknown protein: {id}")]
    UnknownProtein { id: ProteinId },

    /// The protein sits at or beyond the maximum expansion depth.
    /// Informational -- surfaced to the user as a message, never a
    /// crash.
    #[error("protein {id} is at depth {depth}, at or beyond the expansion limit {max}")]
    DepthLimitExceeded { id: ProteinId, depth: u32, max: u32 },
}
