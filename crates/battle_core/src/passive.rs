//! Passive abilities: rule schema and interpreter.
//!
//! A passive is data on the character template. The engine announces it
//! when its trigger fires and then interprets its [`PassiveEffect`]
//! against the owner. Passives without rules are display-only.
//!
//! # Example RON
//!
//! ```ron
//! passive: PassiveData(
//!     name: "Photosynthesis",
//!     rules: Some(PassiveRules(
//!         trigger: start_of_round,
//!         effect: Heal(amount: 8),
//!     )),
//! )
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::PassiveData;
use crate::log::Scribe;
use crate::unit::{BattleUnit, Stat, StatusEffect, StatusKind};

/// Lifecycle points at which a passive can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveTrigger {
    /// During round start, before regen.
    StartOfRound,
    /// During round end, after damage over time and duration ticks.
    EndOfRound,
}

impl PassiveTrigger {
    /// Snake-case label, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PassiveTrigger::StartOfRound => "start_of_round",
            PassiveTrigger::EndOfRound => "end_of_round",
        }
    }
}

impl fmt::Display for PassiveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a passive does once announced. Always targets its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PassiveEffect {
    /// Log the activation and nothing else.
    #[default]
    Announce,
    /// Heal the owner (healing buffs apply).
    Heal {
        /// Base heal amount.
        amount: u32,
    },
    /// Give the owner a shield.
    Shield {
        /// Absorption.
        amount: u32,
        /// Rounds the shield lasts.
        duration: u32,
    },
    /// Apply or refresh a status on the owner.
    ApplyStatus {
        /// Status kind.
        kind: StatusKind,
        /// Rounds the status lasts.
        duration: u32,
        /// Stat for buffs and debuffs.
        #[serde(default)]
        stat: Option<Stat>,
        /// Damage per round for poison and burn.
        #[serde(default)]
        damage_per_turn: Option<u32>,
        /// Heal per round for regen.
        #[serde(default)]
        amount: Option<u32>,
    },
    /// Remove negative statuses from the owner.
    Cleanse {
        /// Maximum statuses removed.
        count: usize,
    },
}

impl PassiveEffect {
    /// Run the effect against its owner.
    pub fn apply(&self, owner: &mut BattleUnit, scribe: &mut Scribe<'_>) {
        match *self {
            PassiveEffect::Announce => {}
            PassiveEffect::Heal { amount } => {
                owner.apply_healing(amount, scribe);
            }
            PassiveEffect::Shield { amount, duration } => {
                owner.apply_shield(amount, duration, scribe);
            }
            PassiveEffect::ApplyStatus {
                kind,
                duration,
                stat,
                damage_per_turn,
                amount,
            } => {
                let status = StatusEffect {
                    kind,
                    duration,
                    stat,
                    damage_per_turn,
                    amount,
                };
                owner.apply_status(status, scribe);
            }
            PassiveEffect::Cleanse { count } => {
                owner.cleanse(count, scribe);
            }
        }
    }
}

/// Trigger plus effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassiveRules {
    /// When the passive fires.
    pub trigger: PassiveTrigger,
    /// What it does. Defaults to [`PassiveEffect::Announce`].
    #[serde(default)]
    pub effect: PassiveEffect,
}

impl PassiveData {
    /// Check if this passive fires on `trigger`.
    #[must_use]
    pub fn fires_on(&self, trigger: PassiveTrigger) -> bool {
        self.rules.as_ref().is_some_and(|r| r.trigger == trigger)
    }
}

/// Announce a unit's passive and interpret its effect.
///
/// Does not check the trigger; callers decide when a passive fires.
pub fn trigger_passive(unit: &mut BattleUnit, scribe: &mut Scribe<'_>) {
    scribe.record(format!("{}'s {} activated!", unit.name, unit.passive.name));
    let effect = unit
        .passive
        .rules
        .as_ref()
        .map(|r| r.effect.clone())
        .unwrap_or_default();
    effect.apply(unit, scribe);
}
