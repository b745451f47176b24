//! Move templates and their effect keywords.

use serde::{Deserialize, Serialize};

use super::constants::TypeId;

/// Effect tag on a move. Each keyword fires one effect clause, in the
/// order the move lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// Deal formula damage to each target.
    Damage,
    /// Heal each target by the move's power.
    Heal,
    /// Give each target a shield worth the move's power.
    Shield,
    /// Poison each target.
    Poison,
    /// Stun each target.
    Stun,
    /// Remove one negative status from each target.
    Cleanse,
}

impl Keyword {
    /// Lowercase name as it appears in data files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Damage => "damage",
            Keyword::Heal => "heal",
            Keyword::Shield => "shield",
            Keyword::Poison => "poison",
            Keyword::Stun => "stun",
            Keyword::Cleanse => "cleanse",
        }
    }
}

/// Who a move is aimed at. Resolved by the orchestrator, not the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// One living opponent.
    #[default]
    SingleEnemy,
    /// Every living opponent.
    AllEnemies,
    /// The user.
    #[serde(rename = "self")]
    SelfTarget,
    /// One living teammate other than the user (the user if alone).
    SingleAlly,
    /// Every living teammate, the user included.
    AllAllies,
}

/// Data-driven move definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveTemplate {
    /// Display name.
    pub name: String,

    /// Damage power, heal amount or shield size depending on keywords.
    pub power: u32,

    /// Elemental type of the move.
    #[serde(rename = "type")]
    pub move_type: TypeId,

    /// Rounds the move is unavailable after use.
    #[serde(default)]
    pub cooldown: u32,

    /// Ordered effect keywords.
    #[serde(default)]
    pub keywords: Vec<Keyword>,

    /// Targeting mode.
    #[serde(default)]
    pub target: TargetMode,

    /// Flavour text.
    #[serde(default)]
    pub description: String,
}

impl MoveTemplate {
    /// Check if the move carries a keyword.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Check if the move is aimed at the user's own side.
    #[must_use]
    pub const fn is_supportive(&self) -> bool {
        matches!(
            self.target,
            TargetMode::SelfTarget | TargetMode::SingleAlly | TargetMode::AllAllies
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_data, DataFormat};

    #[test]
    fn test_target_mode_self_spelling() {
        let mode: TargetMode = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(mode, TargetMode::SelfTarget);
        let mode: TargetMode = serde_json::from_str("\"all_allies\"").unwrap();
        assert_eq!(mode, TargetMode::AllAllies);
    }

    #[test]
    fn test_move_from_ron() {
        let ron = r#"MoveTemplate(
            name: "Toxic Spores",
            power: 20,
            type: "nature",
            cooldown: 2,
            keywords: [damage, poison],
            target: all_enemies,
        )"#;
        let mv: MoveTemplate = parse_data(ron, DataFormat::Ron, "inline").unwrap();
        assert_eq!(mv.keywords, vec![Keyword::Damage, Keyword::Poison]);
        assert_eq!(mv.target, TargetMode::AllEnemies);
        assert!(mv.has_keyword(Keyword::Poison));
        assert!(!mv.has_keyword(Keyword::Heal));
        assert!(!mv.is_supportive());
        assert_eq!(mv.description, "");
    }

    #[test]
    fn test_keyword_names_match_serde() {
        for keyword in [
            Keyword::Damage,
            Keyword::Heal,
            Keyword::Shield,
            Keyword::Poison,
            Keyword::Stun,
            Keyword::Cleanse,
        ] {
            let json = serde_json::to_string(&keyword).unwrap();
            assert_eq!(json, format!("\"{}\"", keyword.as_str()));
        }
    }
}
