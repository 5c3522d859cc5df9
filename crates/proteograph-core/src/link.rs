//! Graph links.

use serde::{Deserialize, Serialize};

use crate::effect::EffectKind;
use crate::id::{LinkId, ProteinId};
use crate::interaction::RawInteraction;

/// A directed interaction link between two protein nodes.
///
/// `raw` is the originating pipeline record, carried through opaquely
/// for the details panel and export layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: ProteinId,
    pub target: ProteinId,
    pub effect: EffectKind,
    pub bidirectional: bool,
    pub raw: RawInteraction,
}

impl Link {
    /// Builds a link from a raw record and its resolved effect kind.
    pub fn from_raw(raw: RawInteraction, effect: EffectKind) -> Self {
        let (source, target) = raw.endpoints();
        let bidirectional = raw.is_bidirectional();
        Link {
            id: LinkId::new(source.clone(), target.clone(), effect),
            source,
            target,
            effect,
            bidirectional,
            raw,
        }
    }

    /// Returns `true` when either endpoint is `id`.
    pub fn touches(&self, id: &ProteinId) -> bool {
        self.source == *id || self.target == *id
    }

    /// Returns the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &ProteinId) -> Option<&ProteinId> {
        if self.source == *id {
            Some(&self.target)
        } else if self.target == *id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_derives_identity_and_direction() {
        let raw = RawInteraction::new("TP53", "MDM2", "inhibits").bidirectional();
        let link = Link::from_raw(raw, EffectKind::Inhibits);
        assert_eq!(link.source, ProteinId::from("TP53"));
        assert_eq!(link.target, ProteinId::from("MDM2"));
        assert!(link.bidirectional);
        assert_eq!(link.id, LinkId::new("TP53".into(), "MDM2".into(), EffectKind::Inhibits));
    }

    #[test]
    fn touches_and_other_end() {
        let link = Link::from_raw(RawInteraction::new("A", "B", "binds"), EffectKind::Binds);
        assert!(link.touches(&"A".into()));
        assert!(link.touches(&"B".into()));
        assert!(!link.touches(&"C".into()));
        assert_eq!(link.other_end(&"A".into()), Some(&ProteinId::from("B")));
        assert_eq!(link.other_end(&"C".into()), None);
    }
}
