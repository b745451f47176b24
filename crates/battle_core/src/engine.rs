//! The battle engine: round lifecycle, move execution and win detection.
//!
//! [`BattleEngine`] owns one [`BattleState`] and is the only thing that
//! mutates it. Callers read the state through [`BattleEngine::state`] and
//! drive the battle with the lifecycle methods:
//!
//! ```text
//! init_battle
//! loop {
//!     process_start_of_round
//!     for unit in determine_turn_order { set_turn; execute_move or forfeit_turn }
//!     process_end_of_round
//!     if check_battle_end { break }
//! }
//! ```
//!
//! Units are addressed by [`UnitId`]. Rule outcomes (a move on cooldown, a
//! missing move slot) are reported as [`MoveOutcome`]s; only references to
//! units that do not exist are errors.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::damage::{self, DamageResult};
use crate::data::{CharacterTemplate, Keyword, MoveTemplate, TypeChart};
use crate::error::{BattleError, Result};
use crate::passive::{self, PassiveTrigger};
use crate::snapshot::{BattleSnapshot, SNAPSHOT_VERSION};
use crate::state::{BattleState, Terrain};
use crate::turn_order;
use crate::unit::{BattleUnit, StatusEffect, StatusKind, Team, UnitId};

/// Shield duration granted by the `shield` keyword.
pub const MOVE_SHIELD_DURATION: u32 = 2;

/// Poison duration applied by the `poison` keyword.
pub const MOVE_POISON_DURATION: u32 = 2;

/// Poison damage per round applied by the `poison` keyword.
pub const MOVE_POISON_DAMAGE: u32 = 10;

/// Stun duration applied by the `stun` keyword.
pub const MOVE_STUN_DURATION: u32 = 1;

/// Statuses removed by the `cleanse` keyword.
pub const MOVE_CLEANSE_COUNT: usize = 1;

/// Result of [`BattleEngine::execute_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move resolved and its cooldown was set.
    Executed,
    /// The move slot is still cooling down. Nothing changed.
    OnCooldown,
    /// The attacker has no move in that slot. Nothing changed.
    InvalidMove,
}

impl MoveOutcome {
    /// Check if the move actually resolved.
    #[must_use]
    pub const fn executed(self) -> bool {
        matches!(self, MoveOutcome::Executed)
    }
}

/// Turn-based battle engine.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    chart: TypeChart,
    config: EngineConfig,
    seed: u64,
    rng: ChaCha8Rng,
    state: BattleState,
}

impl BattleEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(chart: TypeChart) -> Self {
        Self::with_config(chart, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    ///
    /// Without a configured seed, one is drawn from OS entropy and kept so
    /// the battle can still be snapshotted and reproduced.
    #[must_use]
    pub fn with_config(chart: TypeChart, config: EngineConfig) -> Self {
        let seed = config
            .seed
            .unwrap_or_else(|| ChaCha8Rng::from_entropy().next_u64());
        Self {
            chart,
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: BattleState::default(),
        }
    }

    /// Resume a battle from a snapshot.
    ///
    /// The RNG continues from where the snapshot left it, so a restored
    /// engine behaves exactly like the one that was saved.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::SnapshotVersion`] for snapshots from another
    /// format version.
    pub fn restore(chart: TypeChart, snapshot: BattleSnapshot) -> Result<Self> {
        snapshot.check_version()?;
        tracing::info!(
            seed = snapshot.seed,
            round = snapshot.state.round,
            "Battle restored from snapshot"
        );
        Ok(Self {
            chart,
            config: snapshot.config,
            seed: snapshot.seed,
            rng: snapshot.rng,
            state: snapshot.state,
        })
    }

    /// Capture everything needed to resume this battle.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            version: SNAPSHOT_VERSION,
            seed: self.seed,
            config: self.config,
            rng: self.rng.clone(),
            state: self.state.clone(),
        }
    }

    /// Read-only view of the live state.
    #[must_use]
    pub const fn state(&self) -> &BattleState {
        &self.state
    }

    /// The type chart used for effectiveness.
    #[must_use]
    pub const fn chart(&self) -> &TypeChart {
        &self.chart
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The seed the RNG was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The engine's seeded RNG.
    ///
    /// Orchestrators draw their random choices from here so one seed
    /// determines the whole battle.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Read the state and draw from the RNG at the same time.
    pub fn state_and_rng(&mut self) -> (&BattleState, &mut ChaCha8Rng) {
        (&self.state, &mut self.rng)
    }

    /// Deterministic digest of the current state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }

    /// Start a new battle, replacing any previous state.
    pub fn init_battle(
        &mut self,
        allies: &[CharacterTemplate],
        enemies: &[CharacterTemplate],
    ) -> &BattleState {
        let allies = allies
            .iter()
            .map(|t| BattleUnit::from_template(t, Team::Ally))
            .collect();
        let enemies = enemies
            .iter()
            .map(|t| BattleUnit::from_template(t, Team::Enemy))
            .collect();
        self.state = BattleState::new(allies, enemies);
        self.state.log("Battle started!");

        tracing::info!(
            allies = self.state.allies.len(),
            enemies = self.state.enemies.len(),
            seed = self.seed,
            tie_break = self.config.tie_break.as_str(),
            "Battle initialized"
        );
        &self.state
    }

    fn unit(&self, id: UnitId) -> Result<&BattleUnit> {
        self.state.try_unit(id)
    }

    /// Compute the damage `attacker` would deal to `defender` with `mv`.
    ///
    /// Pure: nothing is changed or logged.
    pub fn calculate_damage(
        &self,
        attacker: UnitId,
        defender: UnitId,
        mv: &MoveTemplate,
    ) -> Result<DamageResult> {
        Ok(damage::calculate_damage(
            &self.chart,
            self.unit(attacker)?,
            self.unit(defender)?,
            mv,
        ))
    }

    /// Apply damage to a unit through its shields.
    ///
    /// Returns the damage that was not absorbed by shields.
    pub fn apply_damage(&mut self, target: UnitId, amount: u32) -> Result<u32> {
        let (unit, mut scribe) = self.unit_and_scribe(target)?;
        Ok(unit.apply_damage(amount, &mut scribe))
    }

    /// Heal a unit. Returns the amount actually restored.
    pub fn apply_healing(&mut self, target: UnitId, base_amount: u32) -> Result<u32> {
        let (unit, mut scribe) = self.unit_and_scribe(target)?;
        Ok(unit.apply_healing(base_amount, &mut scribe))
    }

    /// Apply or refresh a status on a unit.
    pub fn apply_status(&mut self, target: UnitId, status: StatusEffect) -> Result<()> {
        let (unit, mut scribe) = self.unit_and_scribe(target)?;
        unit.apply_status(status, &mut scribe);
        Ok(())
    }

    /// Give a unit a shield.
    pub fn apply_shield(&mut self, target: UnitId, amount: u32, duration: u32) -> Result<()> {
        let (unit, mut scribe) = self.unit_and_scribe(target)?;
        unit.apply_shield(amount, duration, &mut scribe);
        Ok(())
    }

    /// Remove up to `count` negative statuses. Returns how many went.
    pub fn cleanse(&mut self, target: UnitId, count: usize) -> Result<usize> {
        let (unit, mut scribe) = self.unit_and_scribe(target)?;
        Ok(unit.cleanse(count, &mut scribe))
    }

    /// Order this round's living units by speed.
    pub fn determine_turn_order(&mut self) -> Vec<UnitId> {
        turn_order::determine_turn_order(&self.state, self.config.tie_break, &mut self.rng)
    }

    /// Record which turn of the round is being played.
    pub fn set_turn(&mut self, turn: u32) {
        self.state.turn = turn;
    }

    /// Place terrain on one side, replacing whatever was there.
    pub fn set_terrain(&mut self, side: Team, terrain: Terrain) {
        self.state
            .log(format!("{} settled on the {side} side!", terrain.name));
        *self.state.terrain.slot_mut(side) = Some(terrain);
    }

    /// Round start: passives, then regen, for every living unit.
    pub fn process_start_of_round(&mut self) {
        self.state.turn = 0;
        let round = self.state.round;
        self.state.log(format!("=== Round {round} Start ==="));
        tracing::debug!(round, "Round start");

        for id in self.state.unit_ids().collect::<Vec<_>>() {
            let Some((unit, mut scribe)) = self.state.unit_and_scribe(id) else {
                continue;
            };
            if unit.is_defeated {
                continue;
            }
            if unit.passive.fires_on(PassiveTrigger::StartOfRound) {
                passive::trigger_passive(unit, &mut scribe);
            }
            unit.tick_regen(&mut scribe);
        }

        self.debug_validate();
    }

    /// Resolve a move.
    ///
    /// Keywords apply in declared order, each to every target. The move's
    /// cooldown is set even when `targets` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownUnit`] if the attacker or any target
    /// does not exist. Nothing is changed in that case.
    pub fn execute_move(
        &mut self,
        attacker: UnitId,
        move_index: usize,
        targets: &[UnitId],
    ) -> Result<MoveOutcome> {
        let user = self.unit(attacker)?;
        if let Some(missing) = targets.iter().find(|id| self.state.unit(**id).is_none()) {
            return Err(BattleError::UnknownUnit(*missing));
        }

        let Some(mv) = user.moves.get(move_index).cloned() else {
            let message = format!("{} has no move in slot {move_index}!", user.name);
            tracing::warn!(unit = %attacker, move_index, "Move slot does not exist");
            self.state.log(message);
            return Ok(MoveOutcome::InvalidMove);
        };

        if !user.move_ready(move_index) {
            tracing::warn!(unit = %attacker, mv = %mv.name, "Move rejected: on cooldown");
            self.state.log(format!("{} is on cooldown!", mv.name));
            return Ok(MoveOutcome::OnCooldown);
        }

        let user_name = user.name.clone();
        self.state.log(format!("{user_name} used {}!", mv.name));

        for keyword in &mv.keywords {
            for &target in targets {
                self.apply_keyword(*keyword, attacker, target, &mv)?;
            }
        }

        if let Some(cooldown) = self
            .state
            .unit_mut(attacker)
            .and_then(|u| u.cooldowns.get_mut(move_index))
        {
            *cooldown = mv.cooldown;
        }

        self.debug_validate();
        Ok(MoveOutcome::Executed)
    }

    fn apply_keyword(
        &mut self,
        keyword: Keyword,
        attacker: UnitId,
        target: UnitId,
        mv: &MoveTemplate,
    ) -> Result<()> {
        match keyword {
            Keyword::Damage => {
                let result = self.calculate_damage(attacker, target, mv)?;
                let (unit, mut scribe) = self.unit_and_scribe(target)?;
                unit.apply_damage(result.damage, &mut scribe);
                let line = format!(
                    "{} took {} damage! {}",
                    unit.name,
                    result.damage,
                    result.effectiveness.label()
                );
                scribe.record(line.trim_end());
            }
            Keyword::Heal => {
                self.apply_healing(target, mv.power)?;
            }
            Keyword::Shield => {
                self.apply_shield(target, mv.power, MOVE_SHIELD_DURATION)?;
            }
            Keyword::Poison => {
                let status = StatusEffect::new(StatusKind::Poison, MOVE_POISON_DURATION)
                    .with_damage_per_turn(MOVE_POISON_DAMAGE);
                self.apply_status(target, status)?;
            }
            Keyword::Stun => {
                self.apply_status(target, StatusEffect::new(StatusKind::Stun, MOVE_STUN_DURATION))?;
            }
            Keyword::Cleanse => {
                self.cleanse(target, MOVE_CLEANSE_COUNT)?;
            }
        }
        Ok(())
    }

    /// Round end: damage over time and duration ticks for every unit alive
    /// when its turn in the sweep comes, then that unit's passive if it
    /// survived, then terrain. Advances the round counter.
    ///
    /// Passives fire after the ticks, so a shield or status they grant
    /// carries into the next round at full duration.
    pub fn process_end_of_round(&mut self) {
        for id in self.state.unit_ids().collect::<Vec<_>>() {
            let Some((unit, mut scribe)) = self.state.unit_and_scribe(id) else {
                continue;
            };
            if unit.is_defeated {
                continue;
            }
            unit.tick_damage_over_time(&mut scribe);
            unit.tick_cooldowns();
            unit.tick_statuses(&mut scribe);
            unit.tick_shields(&mut scribe);
            if unit.is_alive() && unit.passive.fires_on(PassiveTrigger::EndOfRound) {
                passive::trigger_passive(unit, &mut scribe);
            }
        }

        self.tick_terrain();

        let round = self.state.round;
        self.state.log(format!("=== Round {round} End ==="));
        self.state.round += 1;
        tracing::debug!(round, state_hash = self.state.state_hash(), "Round end");

        self.debug_validate();
    }

    fn tick_terrain(&mut self) {
        for side in [Team::Ally, Team::Enemy] {
            let slot = self.state.terrain.slot_mut(side);
            let Some(terrain) = slot.as_mut() else {
                continue;
            };
            terrain.duration = terrain.duration.saturating_sub(1);
            if terrain.duration == 0 {
                let name = terrain.name.clone();
                *slot = None;
                self.state.log(format!("{name} dissipated."));
            }
        }
    }

    /// Announce a unit's passive and run its effect if it fires on
    /// `trigger`. Returns whether it fired.
    ///
    /// A passive with another trigger, or with no rules, is skipped
    /// without a log entry.
    pub fn trigger_passive(&mut self, id: UnitId, trigger: PassiveTrigger) -> Result<bool> {
        let (unit, mut scribe) = self.unit_and_scribe(id)?;
        if !unit.passive.fires_on(trigger) {
            tracing::debug!(
                unit = %id,
                %trigger,
                passive = %unit.passive.name,
                "Passive skipped"
            );
            return Ok(false);
        }
        passive::trigger_passive(unit, &mut scribe);
        Ok(true)
    }

    /// Check if a unit may take its turn.
    ///
    /// Defeated units and units that are stunned, asleep or frozen may not.
    /// Unknown units may not either.
    #[must_use]
    pub fn can_act(&self, id: UnitId) -> bool {
        self.state
            .unit(id)
            .is_some_and(|u| u.is_alive() && u.incapacitating_status().is_none())
    }

    /// Spend a unit's turn without acting, logging why.
    pub fn forfeit_turn(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit(id)?;
        let message = match unit.incapacitating_status() {
            Some(StatusKind::Sleep) => format!("{} is asleep and cannot move!", unit.name),
            Some(StatusKind::Freeze) => format!("{} is frozen and cannot move!", unit.name),
            Some(_) => format!("{} is stunned and cannot move!", unit.name),
            None => format!("{} cannot move!", unit.name),
        };
        self.state.log(message);
        Ok(())
    }

    /// Check if one side has been wiped out, recording the winner once.
    ///
    /// A simultaneous wipe counts as a defeat for the allies.
    pub fn check_battle_end(&mut self) -> bool {
        if self.state.winner.is_some() {
            return true;
        }

        let winner = if self.state.is_wiped_out(Team::Ally) {
            self.state.log("=== DEFEAT ===");
            Team::Enemy
        } else if self.state.is_wiped_out(Team::Enemy) {
            self.state.log("=== VICTORY! ===");
            Team::Ally
        } else {
            return false;
        };

        self.state.winner = Some(winner);
        tracing::info!(
            winner = winner.as_str(),
            round = self.state.round,
            "Battle over"
        );
        true
    }

    fn unit_and_scribe(
        &mut self,
        id: UnitId,
    ) -> Result<(&mut BattleUnit, crate::log::Scribe<'_>)> {
        self.state
            .unit_and_scribe(id)
            .ok_or(BattleError::UnknownUnit(id))
    }

    #[cfg(feature = "debug-validation")]
    fn debug_validate(&self) {
        for (id, unit) in self.state.living_units() {
            debug_assert!(
                unit.current_hp <= unit.max_hp,
                "{id} has {} of {} HP",
                unit.current_hp,
                unit.max_hp
            );
            debug_assert!(unit.current_hp > 0, "{id} is alive at 0 HP");
            debug_assert_eq!(unit.cooldowns.len(), unit.moves.len());
        }
    }

    #[cfg(not(feature = "debug-validation"))]
    #[allow(clippy::unused_self)]
    fn debug_validate(&self) {}
}
