//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::turn_order::TieBreak;

/// Knobs that change how the engine resolves otherwise-unspecified choices.
///
/// Serde-derived so it can be embedded in RON scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for the engine RNG. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// How equal-speed units are ordered.
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl EngineConfig {
    /// Builder method to set the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to set the tie-break strategy.
    #[must_use]
    pub const fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.tie_break, TieBreak::Stable);
    }

    #[test]
    fn test_ron_with_missing_fields() {
        let config: EngineConfig = ron::from_str("(seed: Some(7))").unwrap();
        assert_eq!(config, EngineConfig::default().with_seed(7));

        let config: EngineConfig = ron::from_str("(tie_break: shuffle)").unwrap();
        assert_eq!(config.tie_break, TieBreak::Shuffle);
    }
}
