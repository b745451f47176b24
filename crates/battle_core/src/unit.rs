//! Per-combatant battle state.
//!
//! A [`BattleUnit`] is built once from a [`CharacterTemplate`] when the
//! battle starts and mutated in place until the battle ends. Units are
//! never removed from their roster; defeat is a flag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{BaseStats, CharacterTemplate, MoveTemplate, PassiveData, TypeId};

/// Which side of the battle a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The player's party.
    Ally,
    /// The opposing party.
    Enemy,
}

impl Team {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Ally => Team::Enemy,
            Team::Enemy => Team::Ally,
        }
    }

    /// Lowercase label (`"ally"` / `"enemy"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Team::Ally => "ally",
            Team::Enemy => "enemy",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable reference to a unit: its team and roster slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId {
    /// Roster the unit belongs to.
    pub team: Team,
    /// Index within that roster.
    pub slot: usize,
}

impl UnitId {
    /// Reference an ally slot.
    #[must_use]
    pub const fn ally(slot: usize) -> Self {
        Self {
            team: Team::Ally,
            slot,
        }
    }

    /// Reference an enemy slot.
    #[must_use]
    pub const fn enemy(slot: usize) -> Self {
        Self {
            team: Team::Enemy,
            slot,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.team, self.slot)
    }
}

/// Stat names referenced by buff and debuff payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Hit points.
    Hp,
    /// Offensive power.
    Power,
    /// Physical defense.
    Defense,
    /// Magic resistance.
    #[serde(alias = "magicResist")]
    MagicResist,
    /// Speed.
    Speed,
}

/// Kinds of status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Damage over time, ticked at round end.
    Poison,
    /// Damage over time, ticked at round end.
    Burn,
    /// Loses turns.
    Stun,
    /// Loses turns.
    Sleep,
    /// Loses turns.
    Freeze,
    /// Heals at round start.
    Regen,
    /// Raises a stat (power buffs raise outgoing damage).
    Buff,
    /// Lowers a stat (defense debuffs raise incoming damage).
    Debuff,
    /// Raises incoming healing.
    HealingBuff,
}

impl StatusKind {
    /// Statuses removable by cleanse.
    pub const NEGATIVE: [StatusKind; 6] = [
        StatusKind::Poison,
        StatusKind::Burn,
        StatusKind::Stun,
        StatusKind::Sleep,
        StatusKind::Freeze,
        StatusKind::Debuff,
    ];

    /// Check if cleanse can remove this status.
    #[must_use]
    pub fn is_negative(self) -> bool {
        Self::NEGATIVE.contains(&self)
    }

    /// Check if this status costs the unit its turn.
    #[must_use]
    pub const fn prevents_action(self) -> bool {
        matches!(self, StatusKind::Stun | StatusKind::Sleep | StatusKind::Freeze)
    }

    /// Lowercase name as used in log messages and data files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusKind::Poison => "poison",
            StatusKind::Burn => "burn",
            StatusKind::Stun => "stun",
            StatusKind::Sleep => "sleep",
            StatusKind::Freeze => "freeze",
            StatusKind::Regen => "regen",
            StatusKind::Buff => "buff",
            StatusKind::Debuff => "debuff",
            StatusKind::HealingBuff => "healing_buff",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active status effect on a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Status kind. At most one instance per kind lives on a unit.
    #[serde(rename = "type")]
    pub kind: StatusKind,
    /// Rounds remaining.
    pub duration: u32,
    /// Stat affected by a buff or debuff.
    #[serde(default)]
    pub stat: Option<Stat>,
    /// Damage per round for poison and burn.
    #[serde(default)]
    pub damage_per_turn: Option<u32>,
    /// Heal per round for regen.
    #[serde(default)]
    pub amount: Option<u32>,
}

impl StatusEffect {
    /// Create a status with no payload.
    #[must_use]
    pub const fn new(kind: StatusKind, duration: u32) -> Self {
        Self {
            kind,
            duration,
            stat: None,
            damage_per_turn: None,
            amount: None,
        }
    }

    /// Builder method to set the affected stat.
    #[must_use]
    pub const fn with_stat(mut self, stat: Stat) -> Self {
        self.stat = Some(stat);
        self
    }

    /// Builder method to set damage per round.
    #[must_use]
    pub const fn with_damage_per_turn(mut self, damage: u32) -> Self {
        self.damage_per_turn = Some(damage);
        self
    }

    /// Builder method to set the regen amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Check for a buff/debuff of `kind` on `stat`.
    #[must_use]
    pub fn modifies(&self, kind: StatusKind, stat: Stat) -> bool {
        self.kind == kind && self.stat == Some(stat)
    }
}

/// A damage-absorbing shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shield {
    /// Remaining absorption.
    pub amount: u32,
    /// Rounds remaining.
    pub duration: u32,
}

impl Shield {
    /// Create a shield.
    #[must_use]
    pub const fn new(amount: u32, duration: u32) -> Self {
        Self { amount, duration }
    }
}

/// Mutable battle state of one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleUnit {
    /// Display name.
    pub name: String,
    /// Side this unit fights for.
    pub team: Team,
    /// Elemental types; the first is used for effectiveness.
    pub types: Vec<TypeId>,
    /// Stats as authored.
    pub base_stats: BaseStats,
    /// Working copy of the stats. Buffs live in `statuses`, not here.
    pub current_stats: BaseStats,
    /// Moves in slot order.
    pub moves: Vec<MoveTemplate>,
    /// Passive ability.
    pub passive: PassiveData,
    /// Current hit points, `0..=max_hp`.
    pub current_hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Active statuses in application order.
    pub statuses: Vec<StatusEffect>,
    /// Active shields; the last one absorbs first.
    pub shields: Vec<Shield>,
    /// Rounds until each move slot is usable again.
    pub cooldowns: Vec<u32>,
    /// Names of summoned companions. Nothing summons yet.
    pub summons: Vec<String>,
    /// True once `current_hp` reaches 0.
    pub is_defeated: bool,
}

impl BattleUnit {
    /// Build a fresh unit from a template.
    #[must_use]
    pub fn from_template(template: &CharacterTemplate, team: Team) -> Self {
        Self {
            name: template.name.clone(),
            team,
            types: template.types.clone(),
            base_stats: template.stats,
            current_stats: template.stats,
            moves: template.moves.clone(),
            passive: template.passive.clone(),
            current_hp: template.stats.hp,
            max_hp: template.stats.hp,
            statuses: Vec::new(),
            shields: Vec::new(),
            cooldowns: vec![0; template.moves.len()],
            summons: Vec::new(),
            is_defeated: false,
        }
    }

    /// Check if the unit can still fight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_defeated
    }

    /// Type used for effectiveness lookups.
    #[must_use]
    pub fn primary_type(&self) -> Option<&TypeId> {
        self.types.first()
    }

    /// Find an active status by kind.
    #[must_use]
    pub fn status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.statuses.iter().find(|s| s.kind == kind)
    }

    /// Check for an active status.
    #[must_use]
    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status(kind).is_some()
    }

    /// The first status that costs this unit its turn, if any.
    #[must_use]
    pub fn incapacitating_status(&self) -> Option<StatusKind> {
        self.statuses
            .iter()
            .map(|s| s.kind)
            .find(|k| k.prevents_action())
    }

    /// Count statuses that match a predicate.
    pub fn count_statuses(&self, predicate: impl Fn(&StatusEffect) -> bool) -> usize {
        self.statuses.iter().filter(|s| predicate(s)).count()
    }

    /// Sum of remaining shield absorption.
    #[must_use]
    pub fn total_shield(&self) -> u32 {
        self.shields.iter().map(|s| s.amount).sum()
    }

    /// Check if a move slot exists and is off cooldown.
    #[must_use]
    pub fn move_ready(&self, index: usize) -> bool {
        self.cooldowns.get(index).is_some_and(|cd| *cd == 0)
    }

    /// Indices of moves that are off cooldown.
    pub fn ready_moves(&self) -> impl Iterator<Item = usize> + '_ {
        self.cooldowns
            .iter()
            .enumerate()
            .filter(|(_, cd)| **cd == 0)
            .map(|(i, _)| i)
    }

    /// Health as a fraction of maximum (0.0 to 1.0).
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Keyword, TargetMode};

    fn template() -> CharacterTemplate {
        CharacterTemplate {
            id: "glowmoss".to_string(),
            name: "Glowmoss".to_string(),
            types: vec![TypeId::new("nature"), TypeId::new("light")],
            stats: BaseStats {
                hp: 120,
                power: 30,
                defense: 40,
                magic_resist: 35,
                speed: 30,
            },
            moves: vec![
                MoveTemplate {
                    name: "Mend".to_string(),
                    power: 25,
                    move_type: TypeId::new("nature"),
                    cooldown: 1,
                    keywords: vec![Keyword::Heal],
                    target: TargetMode::SingleAlly,
                    description: String::new(),
                },
                MoveTemplate {
                    name: "Spore Puff".to_string(),
                    power: 15,
                    move_type: TypeId::new("nature"),
                    cooldown: 0,
                    keywords: vec![Keyword::Damage],
                    target: TargetMode::SingleEnemy,
                    description: String::new(),
                },
            ],
            passive: PassiveData {
                name: "Bioluminescence".to_string(),
                ..PassiveData::default()
            },
            title: String::new(),
            role_primary: String::new(),
            role_secondary: None,
            rarity: String::new(),
            rank: 0,
            synergy_tags: Vec::new(),
            exploration_perk: None,
        }
    }

    #[test]
    fn test_from_template_initial_state() {
        let unit = BattleUnit::from_template(&template(), Team::Enemy);
        assert_eq!(unit.team, Team::Enemy);
        assert_eq!(unit.current_hp, 120);
        assert_eq!(unit.max_hp, 120);
        assert_eq!(unit.current_stats, unit.base_stats);
        assert_eq!(unit.cooldowns, vec![0, 0]);
        assert!(unit.statuses.is_empty());
        assert!(unit.shields.is_empty());
        assert!(unit.summons.is_empty());
        assert!(unit.is_alive());
        assert_eq!(unit.primary_type().map(TypeId::as_str), Some("nature"));
    }

    #[test]
    fn test_ready_moves() {
        let mut unit = BattleUnit::from_template(&template(), Team::Ally);
        unit.cooldowns[0] = 2;
        assert!(!unit.move_ready(0));
        assert!(unit.move_ready(1));
        assert!(!unit.move_ready(7));
        assert_eq!(unit.ready_moves().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_incapacitating_status() {
        let mut unit = BattleUnit::from_template(&template(), Team::Ally);
        unit.statuses.push(StatusEffect::new(StatusKind::Poison, 2));
        assert_eq!(unit.incapacitating_status(), None);
        unit.statuses.push(StatusEffect::new(StatusKind::Sleep, 1));
        assert_eq!(unit.incapacitating_status(), Some(StatusKind::Sleep));
    }

    #[test]
    fn test_negative_statuses() {
        assert!(StatusKind::Poison.is_negative());
        assert!(StatusKind::Debuff.is_negative());
        assert!(!StatusKind::Buff.is_negative());
        assert!(!StatusKind::Regen.is_negative());
        assert!(!StatusKind::HealingBuff.is_negative());
    }

    #[test]
    fn test_status_serde_names() {
        let status = StatusEffect::new(StatusKind::HealingBuff, 3);
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"type\":\"healing_buff\""));
        let back: StatusEffect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_unit_id_display() {
        assert_eq!(UnitId::ally(2).to_string(), "ally#2");
        assert_eq!(UnitId::enemy(0).to_string(), "enemy#0");
        assert_eq!(Team::Ally.opponent(), Team::Enemy);
    }
}
