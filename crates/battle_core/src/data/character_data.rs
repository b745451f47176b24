//! Character templates for data-driven combatants.

use serde::{Deserialize, Serialize};

use super::constants::TypeId;
use super::move_data::MoveTemplate;
use crate::passive::PassiveRules;

/// Base statistics of a character.
///
/// Copied into a unit's `current_stats` when a battle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum (and starting) hit points.
    pub hp: u32,
    /// Offensive stat used by the damage formula.
    pub power: u32,
    /// Defensive stat used by the damage formula.
    pub defense: u32,
    /// Magic resistance. Carried for display; no current rule reads it.
    #[serde(default, alias = "magicResist")]
    pub magic_resist: u32,
    /// Turn-order priority (higher acts first).
    pub speed: u32,
}

/// A character's passive ability.
///
/// Passives without `rules` never fire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PassiveData {
    /// Display name used in activation messages.
    pub name: String,
    /// Flavour text for character cards.
    #[serde(default)]
    pub description: String,
    /// Icon glyph for character cards.
    #[serde(default)]
    pub icon: String,
    /// Trigger and effect.
    #[serde(default)]
    pub rules: Option<PassiveRules>,
}

/// A perk used outside of battle. Display-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExplorationPerk {
    /// Perk name.
    pub name: String,
    /// Perk description.
    #[serde(default)]
    pub description: String,
}

/// Data-driven character definition.
///
/// Immutable input to [`crate::engine::BattleEngine::init_battle`]. The
/// engine does not validate templates; `battle_tools validate` does.
///
/// # Example RON
///
/// ```ron
/// CharacterTemplate(
///     id: "sparkfin",
///     name: "Sparkfin",
///     types: ["water", "spark"],
///     stats: BaseStats(hp: 90, power: 45, defense: 25, magic_resist: 30, speed: 70),
///     moves: [
///         MoveTemplate(
///             name: "Static Splash",
///             power: 40,
///             type: "spark",
///             cooldown: 0,
///             keywords: [damage],
///             target: single_enemy,
///             description: "A crackling splash of water.",
///         ),
///     ],
///     passive: PassiveData(name: "Slippery"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterTemplate {
    /// Unique string identifier (file stem by convention).
    #[serde(default)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Elemental types; only the first participates in effectiveness.
    pub types: Vec<TypeId>,

    /// Base statistics.
    pub stats: BaseStats,

    /// Moves in slot order. Cooldowns are tracked per slot.
    pub moves: Vec<MoveTemplate>,

    /// Passive ability.
    pub passive: PassiveData,

    /// Card subtitle.
    #[serde(default)]
    pub title: String,

    /// Primary party role (e.g. "striker", "support").
    #[serde(default)]
    pub role_primary: String,

    /// Optional secondary role.
    #[serde(default)]
    pub role_secondary: Option<String>,

    /// Rarity label for cards.
    #[serde(default)]
    pub rarity: String,

    /// Collection rank for cards.
    #[serde(default)]
    pub rank: u32,

    /// Team synergy tags.
    #[serde(default)]
    pub synergy_tags: Vec<String>,

    /// Out-of-battle perk shown on cards.
    #[serde(default)]
    pub exploration_perk: Option<ExplorationPerk>,
}

impl CharacterTemplate {
    /// The type used for effectiveness lookups, if any.
    #[must_use]
    pub fn primary_type(&self) -> Option<&TypeId> {
        self.types.first()
    }

    /// Return a copy renamed for use on the other side of a mirror match.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Check if this character carries the given synergy tag.
    #[must_use]
    pub fn has_synergy(&self, tag: &str) -> bool {
        self.synergy_tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_data, DataFormat};

    const TRAPPER_JSON: &str = r#"{
        "id": "trapper",
        "name": "Trapper",
        "title": "Keeper of Snares",
        "types": ["nature"],
        "stats": { "hp": 110, "power": 50, "defense": 35, "magicResist": 20, "speed": 55 },
        "moves": [
            {
                "name": "Vine Lash",
                "power": 45,
                "type": "nature",
                "cooldown": 0,
                "keywords": ["damage"],
                "target": "single_enemy",
                "description": "Whips a single enemy."
            }
        ],
        "passive": { "name": "Camouflage", "description": "Hard to spot." },
        "synergy_tags": ["forest"],
        "exploration_perk": { "name": "Trailfinder", "description": "Reveals hidden paths." }
    }"#;

    #[test]
    fn test_parses_json_character() {
        let template: CharacterTemplate =
            parse_data(TRAPPER_JSON, DataFormat::Json, "trapper.json").unwrap();
        assert_eq!(template.name, "Trapper");
        assert_eq!(template.stats.magic_resist, 20);
        assert_eq!(template.moves.len(), 1);
        assert_eq!(template.primary_type().map(TypeId::as_str), Some("nature"));
        assert!(template.passive.rules.is_none());
        assert!(template.has_synergy("forest"));
        assert!(!template.has_synergy("ocean"));
        assert_eq!(
            template.exploration_perk.map(|p| p.name),
            Some("Trailfinder".to_string())
        );
    }

    #[test]
    fn test_missing_required_field_fails() {
        let broken = TRAPPER_JSON.replace("\"stats\"", "\"statz\"");
        let result: crate::error::Result<CharacterTemplate> =
            parse_data(&broken, DataFormat::Json, "broken.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_renamed_keeps_everything_else() {
        let template: CharacterTemplate =
            parse_data(TRAPPER_JSON, DataFormat::Json, "trapper.json").unwrap();
        let enemy = template.renamed("Enemy Trapper");
        assert_eq!(enemy.name, "Enemy Trapper");
        assert_eq!(enemy.stats, template.stats);
        assert_eq!(enemy.moves, template.moves);
    }
}
