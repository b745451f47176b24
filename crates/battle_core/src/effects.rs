//! Rule primitives that mutate a single unit.
//!
//! Each primitive narrates through a [`Scribe`] so the engine can keep a
//! mutable borrow of the unit and the log at the same time.

use crate::damage::modified_healing;
use crate::log::Scribe;
use crate::unit::{BattleUnit, Shield, StatusEffect, StatusKind};

/// Poison damage per round when the status carries no payload.
pub const DEFAULT_POISON_DAMAGE: u32 = 10;

/// Burn damage per round when the status carries no payload.
pub const DEFAULT_BURN_DAMAGE: u32 = 8;

/// Regen healing per round when the status carries no payload.
pub const DEFAULT_REGEN_AMOUNT: u32 = 5;

impl BattleUnit {
    /// Apply damage, draining shields from the most recent one first.
    ///
    /// Returns the damage left over after shields (the part that reached,
    /// or would have reached, hit points).
    pub fn apply_damage(&mut self, amount: u32, scribe: &mut Scribe<'_>) -> u32 {
        let mut remaining = amount;

        let mut index = self.shields.len();
        while index > 0 {
            index -= 1;
            let shield = &mut self.shields[index];
            if shield.amount >= remaining {
                shield.amount -= remaining;
                let depleted = shield.amount == 0;
                scribe.record(format!(
                    "{}'s shield absorbed {remaining} damage!",
                    self.name
                ));
                remaining = 0;
                if depleted {
                    self.shields.remove(index);
                }
                break;
            }
            remaining -= shield.amount;
            scribe.record(format!("{}'s shield broke!", self.name));
            self.shields.remove(index);
        }

        if remaining > 0 {
            self.current_hp = self.current_hp.saturating_sub(remaining);
            if self.current_hp == 0 {
                self.is_defeated = true;
                scribe.record(format!("{} was defeated!", self.name));
            }
        }

        remaining
    }

    /// Heal, never past `max_hp`. Returns the amount actually restored.
    ///
    /// Defeat is not checked: healing a defeated unit raises `current_hp`
    /// but leaves `is_defeated` set, so the unit stays out of the fight.
    /// Orchestrators should only target living units.
    pub fn apply_healing(&mut self, base_amount: u32, scribe: &mut Scribe<'_>) -> u32 {
        let healing = modified_healing(self, base_amount);
        let actual = healing.min(self.max_hp.saturating_sub(self.current_hp));
        self.current_hp += actual;
        scribe.record(format!("{} restored {actual} HP!", self.name));
        actual
    }

    /// Apply a status, or refresh the duration of an existing one.
    ///
    /// A refresh only overwrites the duration; the existing payload stays.
    pub fn apply_status(&mut self, status: StatusEffect, scribe: &mut Scribe<'_>) {
        if let Some(index) = self.statuses.iter().position(|s| s.kind == status.kind) {
            self.statuses[index].duration = status.duration;
            scribe.record(format!("{}'s {} was refreshed!", self.name, status.kind));
        } else {
            let kind = status.kind;
            self.statuses.push(status);
            scribe.record(format!("{} was afflicted with {kind}!", self.name));
        }
    }

    /// Add a shield. Shields always stack.
    pub fn apply_shield(&mut self, amount: u32, duration: u32, scribe: &mut Scribe<'_>) {
        self.shields.push(Shield::new(amount, duration));
        scribe.record(format!("{} gained a shield of {amount}!", self.name));
    }

    /// Remove up to `count` negative statuses, newest first.
    ///
    /// Returns how many were removed.
    pub fn cleanse(&mut self, count: usize, scribe: &mut Scribe<'_>) -> usize {
        let mut cleansed = 0;
        let mut index = self.statuses.len();
        while index > 0 && cleansed < count {
            index -= 1;
            let kind = self.statuses[index].kind;
            if kind.is_negative() {
                self.statuses.remove(index);
                scribe.record(format!("{}'s {kind} was cleansed!", self.name));
                cleansed += 1;
            }
        }
        cleansed
    }

    /// Heal once for every regen status.
    pub fn tick_regen(&mut self, scribe: &mut Scribe<'_>) {
        let heals: Vec<u32> = self
            .statuses
            .iter()
            .filter(|s| s.kind == StatusKind::Regen)
            .map(|s| s.amount.unwrap_or(DEFAULT_REGEN_AMOUNT))
            .collect();
        for amount in heals {
            self.apply_healing(amount, scribe);
        }
    }

    /// Deal poison and burn damage through shields. Defense does not apply.
    pub fn tick_damage_over_time(&mut self, scribe: &mut Scribe<'_>) {
        let ticks: Vec<(StatusKind, u32)> = self
            .statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::Poison => Some((
                    s.kind,
                    s.damage_per_turn.unwrap_or(DEFAULT_POISON_DAMAGE),
                )),
                StatusKind::Burn => {
                    Some((s.kind, s.damage_per_turn.unwrap_or(DEFAULT_BURN_DAMAGE)))
                }
                _ => None,
            })
            .collect();
        for (kind, damage) in ticks {
            self.apply_damage(damage, scribe);
            scribe.record(format!("{} took {damage} {kind} damage!", self.name));
        }
    }

    /// Count every cooldown down by one, stopping at zero.
    pub fn tick_cooldowns(&mut self) {
        for cooldown in &mut self.cooldowns {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    /// Count status durations down, dropping the expired ones.
    pub fn tick_statuses(&mut self, scribe: &mut Scribe<'_>) {
        let name = &self.name;
        self.statuses.retain_mut(|status| {
            status.duration = status.duration.saturating_sub(1);
            if status.duration == 0 {
                scribe.record(format!("{name}'s {} wore off.", status.kind));
                return false;
            }
            true
        });
    }

    /// Count shield durations down, dropping the expired ones.
    pub fn tick_shields(&mut self, scribe: &mut Scribe<'_>) {
        let name = &self.name;
        self.shields.retain_mut(|shield| {
            shield.duration = shield.duration.saturating_sub(1);
            if shield.duration == 0 {
                scribe.record(format!("{name}'s shield expired."));
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BaseStats, PassiveData, TypeId};
    use crate::log::BattleLog;
    use crate::unit::{Stat, Team};

    fn unit(hp: u32) -> BattleUnit {
        let stats = BaseStats {
            hp,
            power: 10,
            defense: 10,
            magic_resist: 0,
            speed: 10,
        };
        BattleUnit {
            name: "Target".to_string(),
            team: Team::Enemy,
            types: vec![TypeId::new("stone")],
            base_stats: stats,
            current_stats: stats,
            moves: Vec::new(),
            passive: PassiveData::default(),
            current_hp: hp,
            max_hp: hp,
            statuses: Vec::new(),
            shields: Vec::new(),
            cooldowns: vec![0, 2, 1],
            summons: Vec::new(),
            is_defeated: false,
        }
    }

    #[test]
    fn test_newest_shield_absorbs_first() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.shields = vec![Shield::new(10, 2), Shield::new(5, 2)];

        let leftover = target.apply_damage(7, &mut scribe);

        assert_eq!(leftover, 0);
        assert_eq!(target.current_hp, 100);
        assert_eq!(target.shields, vec![Shield::new(8, 2)]);
        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(
            messages,
            vec!["Target's shield broke!", "Target's shield absorbed 2 damage!"]
        );
    }

    #[test]
    fn test_exactly_depleted_shield_is_removed() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.shields = vec![Shield::new(6, 2)];
        assert_eq!(target.apply_damage(6, &mut scribe), 0);
        assert!(target.shields.is_empty());
        assert_eq!(target.current_hp, 100);
    }

    #[test]
    fn test_overflow_reaches_hp_and_defeats() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(20);
        target.shields = vec![Shield::new(5, 1)];
        let leftover = target.apply_damage(40, &mut scribe);
        assert_eq!(leftover, 35);
        assert_eq!(target.current_hp, 0);
        assert!(target.is_defeated);
        assert_eq!(log.last().unwrap().message, "Target was defeated!");
    }

    #[test]
    fn test_healing_never_overheals() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.current_hp = 90;
        assert_eq!(target.apply_healing(25, &mut scribe), 10);
        assert_eq!(target.current_hp, 100);
        assert_eq!(log.last().unwrap().message, "Target restored 10 HP!");
    }

    #[test]
    fn test_healing_does_not_revive() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(50);
        target.apply_damage(50, &mut scribe);
        assert_eq!(target.apply_healing(20, &mut scribe), 20);
        assert_eq!(target.current_hp, 20);
        assert!(target.is_defeated);
        assert!(!target.is_alive());
    }

    #[test]
    fn test_status_refresh_keeps_payload() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.apply_status(
            StatusEffect::new(StatusKind::Poison, 1).with_damage_per_turn(12),
            &mut scribe,
        );
        target.apply_status(
            StatusEffect::new(StatusKind::Poison, 2).with_damage_per_turn(10),
            &mut scribe,
        );
        assert_eq!(target.statuses.len(), 1);
        assert_eq!(target.statuses[0].duration, 2);
        assert_eq!(target.statuses[0].damage_per_turn, Some(12));
        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(
            messages,
            vec![
                "Target was afflicted with poison!",
                "Target's poison was refreshed!"
            ]
        );
    }

    #[test]
    fn test_shields_stack() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.apply_shield(20, 2, &mut scribe);
        target.apply_shield(20, 2, &mut scribe);
        assert_eq!(target.shields.len(), 2);
        assert_eq!(target.total_shield(), 40);
    }

    #[test]
    fn test_cleanse_newest_negative_first() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.statuses = vec![
            StatusEffect::new(StatusKind::Poison, 2),
            StatusEffect::new(StatusKind::Buff, 2).with_stat(Stat::Power),
            StatusEffect::new(StatusKind::Burn, 2),
        ];
        assert_eq!(target.cleanse(1, &mut scribe), 1);
        let kinds: Vec<StatusKind> = target.statuses.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StatusKind::Poison, StatusKind::Buff]);

        assert_eq!(target.cleanse(5, &mut scribe), 1);
        assert_eq!(target.statuses.len(), 1);
        assert_eq!(target.statuses[0].kind, StatusKind::Buff);
    }

    #[test]
    fn test_dot_goes_through_shields() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.statuses = vec![
            StatusEffect::new(StatusKind::Poison, 2),
            StatusEffect::new(StatusKind::Burn, 2),
        ];
        target.shields = vec![Shield::new(12, 3)];
        target.tick_damage_over_time(&mut scribe);
        // poison 10 absorbed (shield 12 -> 2), burn 8: shield breaks, 6 to hp
        assert_eq!(target.current_hp, 94);
        assert!(target.shields.is_empty());
    }

    #[test]
    fn test_ticks_expire_and_floor() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.statuses = vec![
            StatusEffect::new(StatusKind::Stun, 1),
            StatusEffect::new(StatusKind::Regen, 3),
        ];
        target.shields = vec![Shield::new(5, 1), Shield::new(5, 2)];
        target.tick_cooldowns();
        target.tick_statuses(&mut scribe);
        target.tick_shields(&mut scribe);
        assert_eq!(target.cooldowns, vec![0, 1, 0]);
        assert_eq!(target.statuses, vec![StatusEffect::new(StatusKind::Regen, 2)]);
        assert_eq!(target.shields, vec![Shield::new(5, 1)]);
        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(
            messages,
            vec!["Target's stun wore off.", "Target's shield expired."]
        );
    }

    #[test]
    fn test_regen_uses_default_amount() {
        let mut log = BattleLog::new();
        let mut scribe = Scribe::new(&mut log, 1, 0);
        let mut target = unit(100);
        target.current_hp = 50;
        target.statuses = vec![StatusEffect::new(StatusKind::Regen, 2)];
        target.tick_regen(&mut scribe);
        assert_eq!(target.current_hp, 55);
        target.statuses[0].amount = Some(12);
        target.tick_regen(&mut scribe);
        assert_eq!(target.current_hp, 67);
    }
}
