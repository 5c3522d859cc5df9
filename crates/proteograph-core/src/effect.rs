//! Normalization of free-text relation labels to the canonical
//! four-way effect taxonomy.
//!
//! Upstream interaction records carry heterogeneous arrow vocabularies
//! ("stimulates", "represses", "complex formation", ...) plus a
//! secondary intent label. [`EffectKind::classify`] maps any pair of
//! labels to exactly one effect kind; it is total and never errors,
//! because the data is free text and must never block rendering.
//! `Binds` is the universal fallback.

use serde::{Deserialize, Serialize};

/// Canonical relation type between two proteins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Activates,
    Inhibits,
    Binds,
    Regulates,
}

/// Substring synonyms for activation.
const ACTIVATION: &[&str] = &[
    "activat", "stimulat", "induc", "promot", "upregulat", "enhanc",
];

/// Substring synonyms for inhibition.
const INHIBITION: &[&str] = &[
    "inhibit", "repress", "suppress", "downregulat", "degrad", "block",
];

/// Exact-match synonyms for regulation/modulation.
const REGULATION: &[&str] = &[
    "regulates", "regulate", "regulation", "modulates", "modulate", "modulation",
];

/// Exact-match synonyms for physical binding.
const BINDING: &[&str] = &[
    "binds", "bind", "binding", "interacts", "interaction", "associates", "association",
    "complex",
];

/// Sentinel labels meaning "no usable direction information".
const UNDIRECTED: &[&str] = &["undirected", "unknown", "unspecified", "none", "n/a", "-", "?"];

impl EffectKind {
    /// Short lowercase label, matching the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            EffectKind::Activates => "activates",
            EffectKind::Inhibits => "inhibits",
            EffectKind::Binds => "binds",
            EffectKind::Regulates => "regulates",
        }
    }

    /// Resolves a raw arrow label plus a fallback intent label to an
    /// effect kind.
    ///
    /// Resolution order: substring match of the arrow against the
    /// activation then inhibition vocabularies, exact match against the
    /// regulation and binding vocabularies, then the
    /// "activator"/"positive"/"negative" shortcuts. An arrow that is
    /// empty, an undirected sentinel, or simply unrecognized falls back
    /// to the intent label under the same rules; when the intent is
    /// also uninformative the result is `Binds`.
    pub fn classify(arrow: &str, intent: &str) -> EffectKind {
        let arrow = arrow.trim().to_ascii_lowercase();
        if let Some(kind) = resolve_label(&arrow) {
            return kind;
        }
        let intent = intent.trim().to_ascii_lowercase();
        resolve_label(&intent).unwrap_or(EffectKind::Binds)
    }
}

/// Resolves one normalized (trimmed, lowercased) label, or `None` when
/// the label carries no usable information.
fn resolve_label(label: &str) -> Option<EffectKind> {
    if label.is_empty() || UNDIRECTED.contains(&label) {
        return None;
    }
    if ACTIVATION.iter().any(|syn| label.contains(syn)) {
        return Some(EffectKind::Activates);
    }
    if INHIBITION.iter().any(|syn| label.contains(syn)) {
        return Some(EffectKind::Inhibits);
    }
    if REGULATION.contains(&label) {
        return Some(EffectKind::Regulates);
    }
    if BINDING.contains(&label) {
        return Some(EffectKind::Binds);
    }
    match label {
        "activator" | "positive" => Some(EffectKind::Activates),
        "negative" => Some(EffectKind::Inhibits),
        _ => None,
    }
}
