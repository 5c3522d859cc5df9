//! Identifier newtypes for graph entities.
//!
//! Protein identifiers come from upstream data as free-text strings and
//! are used verbatim as node ids. Link identity is deterministic over
//! the `(source, target, effect)` triple so that two distinct effect
//! types between the same pair of proteins coexist as separate links,
//! while duplicate reports of the same effect collapse to one link.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effect::EffectKind;

/// A protein identifier -- globally unique within one graph instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProteinId(String);

impl ProteinId {
    /// Creates a protein id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        ProteinId(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProteinId {
    fn from(id: &str) -> Self {
        ProteinId(id.to_owned())
    }
}

impl From<String> for ProteinId {
    fn from(id: String) -> Self {
        ProteinId(id)
    }
}

/// Deterministic link identity: the `(source, target, effect)` triple.
///
/// Direction matters -- `A -[activates]-> B` and `B -[activates]-> A`
/// are distinct ids. [`LinkId::reversed`] yields the opposite-direction
/// id, used by the merge coordinator to detect mirror reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId {
    pub source: ProteinId,
    pub target: ProteinId,
    pub effect: EffectKind,
}

impl LinkId {
    /// Builds the canonical id for a directed interaction.
    pub fn new(source: ProteinId, target: ProteinId, effect: EffectKind) -> Self {
        LinkId {
            source,
            target,
            effect,
        }
    }

    /// Returns the id of the same effect reported in the opposite
    /// direction.
    pub fn reversed(&self) -> LinkId {
        LinkId {
            source: self.target.clone(),
            target: self.source.clone(),
            effect: self.effect,
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.effect.label(), self.target)
    }
}

/// Tagged reference into the shared reference-count key space.
///
/// Node ids and link ids live in different id spaces; keying the
/// reference-count map by `ElementRef` makes a collision between the
/// two impossible at the type level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Node(ProteinId),
    Link(LinkId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_id_is_deterministic() {
        let a = LinkId::new("TP53".into(), "MDM2".into(), EffectKind::Inhibits);
        let b = LinkId::new("TP53".into(), "MDM2".into(), EffectKind::Inhibits);
        assert_eq!(a, b);
    }

    #[test]
    fn same_pair_different_effect_is_a_different_id() {
        let inhibits = LinkId::new("TP53".into(), "MDM2".into(), EffectKind::Inhibits);
        let binds = LinkId::new("TP53".into(), "MDM2".into(), EffectKind::Binds);
        assert_ne!(inhibits, binds);
    }

    #[test]
    fn reversed_swaps_endpoints_and_keeps_effect() {
        let id = LinkId::new("A".into(), "B".into(), EffectKind::Activates);
        let rev = id.reversed();
        assert_eq!(rev.source, ProteinId::from("B"));
        assert_eq!(rev.target, ProteinId::from("A"));
        assert_eq!(rev.effect, EffectKind::Activates);
        assert_eq!(rev.reversed(), id);
    }

    #[test]
    fn element_refs_from_distinct_id_spaces_never_collide() {
        let node = ElementRef::Node("A".into());
        let link = ElementRef::Link(LinkId::new("A".into(), "A".into(), EffectKind::Binds));
        assert_ne!(node, link);
    }

    #[test]
    fn link_id_display() {
        let id = LinkId::new("EGFR".into(), "GRB2".into(), EffectKind::Binds);
        assert_eq!(format!("{id}"), "EGFR -[binds]-> GRB2");
    }

    #[test]
    fn protein_id_serde_is_transparent() {
        let id = ProteinId::from("BRCA1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"BRCA1\"");
        let back: ProteinId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
