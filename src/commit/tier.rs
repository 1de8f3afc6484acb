//! Model capacity tiers inferred from model identifiers.

use std::fmt;

/// Markers for very large models. Checked first.
const LARGE_MARKERS: &[&str] = &[
    "30b", "32b", "34b", "70b", "72b", "90b", "110b", "123b", "235b", "405b", "480b", "671b",
    "claude", "gpt-5", "opus",
];

/// Markers for very small models. Checked after the large set.
const SMALL_MARKERS: &[&str] = &[
    "0.5b", "0.6b", "1b", "1.1b", "1.5b", "1.7b", "1.8b", "2b", "3b", "tiny",
];

/// Markers for mid-sized models.
const MEDIUM_MARKERS: &[&str] = &["4b", "7b", "8b", "9b", "12b", "13b", "14b", "22b", "27b"];

/// Coarse capability bucket used to pick prompt verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    Small,
    Medium,
    Large,
}

/// Resolution order; the first tier with a matching marker wins.
const TIER_RULES: &[(ModelTier, &[&str])] = &[
    (ModelTier::Large, LARGE_MARKERS),
    (ModelTier::Small, SMALL_MARKERS),
    (ModelTier::Medium, MEDIUM_MARKERS),
];

impl ModelTier {
    /// Resolve a tier from a model identifier.
    ///
    /// Case-insensitive; rules are tried in the order large, small, medium and
    /// the first hit wins. Anything unrecognized is medium.
    pub fn resolve(model: &str) -> Self {
        let model = model.to_lowercase();

        TIER_RULES
            .iter()
            .find(|(_, markers)| contains_any(&model, markers))
            .map_or(ModelTier::Medium, |(tier, _)| *tier)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Small => "small",
            ModelTier::Medium => "medium",
            ModelTier::Large => "large",
        }
    }

    /// Whether change hints and the final-check block are added for this tier.
    pub fn wants_guidance(&self) -> bool {
        !matches!(self, ModelTier::Large)
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain substring containment; `model` is already lowercased.
fn contains_any(model: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| model.contains(marker))
}
