//! Encounter tables: zone enemy pools and tiered enemy stats.
//!
//! Enemies do not carry their own stats. A zone maps to a tier, and the
//! tier's stat line for the enemy's rarity is stamped onto it when the
//! encounter is built.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::character_data::{BaseStats, CharacterTemplate, PassiveData};
use super::constants::TypeId;
use super::move_data::MoveTemplate;

/// Stats used when a tier has no line for an enemy's rarity.
pub const FALLBACK_ENEMY_STATS: BaseStats = BaseStats {
    hp: 60,
    power: 10,
    defense: 8,
    magic_resist: 0,
    speed: 10,
};

/// How rare an enemy is within its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Filler enemy.
    #[serde(alias = "COMMON")]
    Common,
    /// Filler enemy, less frequent.
    #[serde(alias = "UNCOMMON")]
    Uncommon,
    /// Encounter leader.
    #[serde(alias = "RARE")]
    Rare,
    /// Encounter leader, strongest tier.
    #[serde(alias = "ELITE")]
    Elite,
}

impl Rarity {
    /// Lowercase name as it appears in data files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Elite => "elite",
        }
    }

    /// Rare and elite enemies lead an encounter; the rest fill it out.
    #[must_use]
    pub const fn is_leader(self) -> bool {
        matches!(self, Rarity::Rare | Rarity::Elite)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enemy in a zone's pool.
///
/// # Example RON
///
/// ```ron
/// EnemyTemplate(
///     id: "bramble_sprite",
///     name: "Bramble Sprite",
///     zone: "grove",
///     rarity: common,
///     types: ["nature"],
///     moves: [
///         MoveTemplate(name: "Prickle", power: 20, type: "nature", keywords: [damage]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Unique string identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Zone whose pool this enemy belongs to.
    pub zone: String,
    /// Rarity, which picks both its encounter slot and its stat line.
    pub rarity: Rarity,
    /// Elemental types; only the first participates in effectiveness.
    pub types: Vec<TypeId>,
    /// Moves in slot order.
    pub moves: Vec<MoveTemplate>,
    /// Passive ability. Display-only unless it has rules.
    #[serde(default)]
    pub passive: PassiveData,
    /// Combat role label (e.g. "brute", "caster").
    #[serde(default)]
    pub role: String,
}

impl EnemyTemplate {
    /// Build a battle-ready character with the given stats.
    #[must_use]
    pub fn to_character(&self, stats: BaseStats) -> CharacterTemplate {
        CharacterTemplate {
            id: self.id.clone(),
            name: self.name.clone(),
            types: self.types.clone(),
            stats,
            moves: self.moves.clone(),
            passive: self.passive.clone(),
            title: String::new(),
            role_primary: self.role.clone(),
            role_secondary: None,
            rarity: self.rarity.as_str().to_string(),
            rank: 0,
            synergy_tags: Vec::new(),
            exploration_perk: None,
        }
    }
}

/// Zone tiers, tiered stat lines and every zone's enemy pool.
///
/// # Example RON
///
/// ```ron
/// EncounterTable(
///     zone_tiers: { "grove": "tier1" },
///     tier_stats: {
///         "tier1": {
///             common: BaseStats(hp: 70, power: 30, defense: 20, speed: 30),
///             rare: BaseStats(hp: 120, power: 45, defense: 30, speed: 40),
///         },
///     },
///     enemies: [],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EncounterTable {
    /// Zone name to tier name.
    #[serde(default)]
    pub zone_tiers: BTreeMap<String, String>,
    /// Tier name to per-rarity stats.
    #[serde(default)]
    pub tier_stats: BTreeMap<String, BTreeMap<Rarity, BaseStats>>,
    /// All enemies, across zones.
    #[serde(default)]
    pub enemies: Vec<EnemyTemplate>,
}

impl EncounterTable {
    /// Enemies that appear in `zone`, in file order.
    pub fn zone_pool<'a>(&'a self, zone: &'a str) -> impl Iterator<Item = &'a EnemyTemplate> {
        self.enemies.iter().filter(move |e| e.zone == zone)
    }

    /// The tier assigned to `zone`.
    #[must_use]
    pub fn tier(&self, zone: &str) -> Option<&str> {
        self.zone_tiers.get(zone).map(String::as_str)
    }

    /// Tier stats for a rarity in `zone`, if the table has them.
    #[must_use]
    pub fn tier_stats_for(&self, zone: &str, rarity: Rarity) -> Option<BaseStats> {
        let tier = self.tier(zone)?;
        self.tier_stats.get(tier)?.get(&rarity).copied()
    }

    /// Zones that have at least one enemy, sorted and deduplicated.
    #[must_use]
    pub fn zones(&self) -> Vec<&str> {
        let mut zones: Vec<&str> = self.enemies.iter().map(|e| e.zone.as_str()).collect();
        zones.sort_unstable();
        zones.dedup();
        zones
    }
}
