//! Damage formula with type effectiveness and status modifiers.
//!
//! ```text
//! Base Damage  = Move Power × (Attacker Power / (Defender Defense + 50))
//! Modifier     = 0.20 × (attacker power buffs) + 0.15 × (defender defense debuffs)
//! Final Damage = floor(Base Damage × Type Multiplier × (1 + Modifier)), at least 0
//! ```
//!
//! Modifiers are recomputed from the unit's statuses on every call;
//! nothing is cached on the unit.

use crate::data::{MoveTemplate, TypeChart};
use crate::unit::{BattleUnit, Stat, StatusKind};

/// Offset added to defense in the damage denominator.
pub const DEFENSE_OFFSET: f64 = 50.0;

/// Bonus per power buff on the attacker.
pub const POWER_BUFF_BONUS: f64 = 0.20;

/// Bonus per defense debuff on the defender.
pub const DEFENSE_DEBUFF_BONUS: f64 = 0.15;

/// Bonus per healing buff on the healed unit.
pub const HEALING_BUFF_BONUS: f64 = 0.25;

/// Effectiveness class of a type multiplier, for narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effectiveness {
    /// Multiplier 0.0.
    Immune,
    /// Multiplier 0.5.
    Resisted,
    /// Any multiplier without a dedicated label.
    Neutral,
    /// Multiplier 2.0.
    SuperEffective,
}

impl Effectiveness {
    /// Classify a multiplier. Only the exact conventional values get labels.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier == 0.0 {
            Self::Immune
        } else if multiplier == 0.5 {
            Self::Resisted
        } else if multiplier == 2.0 {
            Self::SuperEffective
        } else {
            Self::Neutral
        }
    }

    /// Narration suffix ("" for neutral).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Immune => "IMMUNE!",
            Self::Resisted => "Not very effective...",
            Self::Neutral => "",
            Self::SuperEffective => "SUPER EFFECTIVE!",
        }
    }
}

/// Outcome of the damage formula for one attacker/defender/move triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    /// Damage to apply (before shields).
    pub damage: u32,
    /// Type chart multiplier used.
    pub type_multiplier: f64,
    /// Label class of the multiplier.
    pub effectiveness: Effectiveness,
}

/// Additive damage modifier from statuses.
///
/// Every matching status counts, duplicates included.
#[must_use]
pub fn damage_modifier(attacker: &BattleUnit, defender: &BattleUnit) -> f64 {
    let mut modifier = 0.0;
    for status in &attacker.statuses {
        if status.modifies(StatusKind::Buff, Stat::Power) {
            modifier += POWER_BUFF_BONUS;
        }
    }
    for status in &defender.statuses {
        if status.modifies(StatusKind::Debuff, Stat::Defense) {
            modifier += DEFENSE_DEBUFF_BONUS;
        }
    }
    modifier
}

/// Additive healing modifier from `healing_buff` statuses.
#[must_use]
pub fn healing_modifier(unit: &BattleUnit) -> f64 {
    let mut modifier = 0.0;
    for status in &unit.statuses {
        if status.kind == StatusKind::HealingBuff {
            modifier += HEALING_BUFF_BONUS;
        }
    }
    modifier
}

/// Type multiplier for a move against the defender's first type.
///
/// Secondary types never participate. A defender without types takes
/// neutral damage.
#[must_use]
pub fn type_multiplier(chart: &TypeChart, mv: &MoveTemplate, defender: &BattleUnit) -> f64 {
    defender
        .primary_type()
        .map_or(TypeChart::NEUTRAL, |defense| {
            chart.effectiveness(&mv.move_type, defense)
        })
}

/// Calculate the damage `attacker` deals to `defender` with `mv`.
#[must_use]
pub fn calculate_damage(
    chart: &TypeChart,
    attacker: &BattleUnit,
    defender: &BattleUnit,
    mv: &MoveTemplate,
) -> DamageResult {
    let power = f64::from(attacker.current_stats.power);
    let defense = f64::from(defender.current_stats.defense);
    let base_damage = f64::from(mv.power) * (power / (defense + DEFENSE_OFFSET));

    let multiplier = type_multiplier(chart, mv, defender);
    let modifier = damage_modifier(attacker, defender);

    let final_damage = (base_damage * multiplier * (1.0 + modifier)).floor();

    DamageResult {
        damage: final_damage.max(0.0) as u32,
        type_multiplier: multiplier,
        effectiveness: Effectiveness::from_multiplier(multiplier),
    }
}

/// Apply the healing modifier to a base amount (before the max-HP cap).
#[must_use]
pub fn modified_healing(unit: &BattleUnit, base_amount: u32) -> u32 {
    let healing = (f64::from(base_amount) * (1.0 + healing_modifier(unit))).floor();
    healing.max(0.0) as u32
}
