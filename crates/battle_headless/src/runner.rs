//! Headless battle runner.
//!
//! Drives a [`BattleEngine`] round by round with a scripted [`Policy`],
//! stopping when one side is wiped out or the round cap is reached.

use battle_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::encounter::{build_encounter, Encounter, EncounterConfig, EncounterError};
use crate::roster_loader::RosterRegistry;
use crate::strategies::{plan_turn, Policy};

/// Default round cap, after which an undecided battle is a draw.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Rounds to play before calling a draw.
    pub max_rounds: u32,
    /// RNG seed; entropy when `None`.
    pub seed: Option<u64>,
    /// Turn-order tie-break.
    pub tie_break: TieBreak,
    /// Move selection policy for both sides.
    pub policy: Policy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
            tie_break: TieBreak::default(),
            policy: Policy::default(),
        }
    }
}

impl RunnerConfig {
    /// Set the round cap.
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the tie-break.
    pub const fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Set the policy.
    pub const fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// The engine half of this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::default().with_tie_break(self.tie_break);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// What happened in one simulated round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    /// Round number that was played.
    pub round: u32,
    /// Order the units acted in.
    pub turn_order: Vec<UnitId>,
    /// Index of the first log entry written this round.
    pub log_start: usize,
    /// Whether the battle ended this round (or already had).
    pub is_over: bool,
}

/// Final result of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Winning side, `None` for a draw at the round cap.
    pub winner: Option<Team>,
    /// Rounds fully played.
    pub rounds_played: u32,
    /// Seed the battle ran with.
    pub seed: u64,
    /// Final state hash.
    pub state_hash: u64,
    /// Number of battle log entries.
    pub log_entries: usize,
}

impl BattleOutcome {
    /// Check if the battle ended without a winner.
    pub const fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Scripted battle driver.
#[derive(Debug, Clone)]
pub struct BattleRunner {
    engine: BattleEngine,
    policy: Policy,
    max_rounds: u32,
}

impl BattleRunner {
    /// Create a runner with a fresh engine. Call [`BattleRunner::start`]
    /// before simulating.
    pub fn new(chart: TypeChart, config: RunnerConfig) -> Self {
        Self::from_engine(
            BattleEngine::with_config(chart, config.engine_config()),
            config,
        )
    }

    /// Wrap an existing engine, for example one restored from a snapshot.
    pub fn from_engine(engine: BattleEngine, config: RunnerConfig) -> Self {
        Self {
            engine,
            policy: config.policy,
            max_rounds: config.max_rounds,
        }
    }

    /// Resume a saved battle.
    ///
    /// The snapshot's own seed and tie-break win over `config`; only the
    /// policy and round cap are taken from it.
    pub fn resume(
        chart: TypeChart,
        snapshot: BattleSnapshot,
        config: RunnerConfig,
    ) -> Result<Self> {
        Ok(Self::from_engine(BattleEngine::restore(chart, snapshot)?, config))
    }

    /// Set up both parties.
    pub fn start(&mut self, allies: &[CharacterTemplate], enemies: &[CharacterTemplate]) {
        self.engine.init_battle(allies, enemies);
    }

    /// Generate an encounter from the engine's RNG and start it.
    ///
    /// With a fixed seed the same encounter is drawn every time, and the
    /// battle continues from the same RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the hero is unknown or the zone has no enemies.
    pub fn start_encounter(
        &mut self,
        registry: &RosterRegistry,
        hero: &str,
        zone: &str,
        config: EncounterConfig,
    ) -> std::result::Result<Encounter, EncounterError> {
        let encounter = build_encounter(registry, hero, zone, config, self.engine.rng_mut())?;
        self.start(&encounter.allies, &encounter.enemies);
        Ok(encounter)
    }

    /// The engine being driven.
    pub const fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    /// The round cap.
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Rounds completed so far.
    pub fn rounds_played(&self) -> u32 {
        self.engine.state().round.saturating_sub(1)
    }

    /// Check if another round may be played.
    pub fn can_continue(&self) -> bool {
        self.engine.state().winner.is_none() && self.rounds_played() < self.max_rounds
    }

    /// Play one round with this runner's policy. See [`play_round`].
    pub fn simulate_round(&mut self) -> Result<RoundSummary> {
        play_round(&mut self.engine, self.policy)
    }

    /// Play until a winner or the round cap.
    pub fn run_full_battle(&mut self) -> Result<BattleOutcome> {
        self.run_with(|_, _| {})
    }

    /// Play until a winner or the round cap, calling `on_round` after every
    /// round.
    pub fn run_with<F>(&mut self, mut on_round: F) -> Result<BattleOutcome>
    where
        F: FnMut(&BattleEngine, &RoundSummary),
    {
        while self.can_continue() {
            let summary = self.simulate_round()?;
            on_round(&self.engine, &summary);
            if summary.is_over {
                break;
            }
        }

        let outcome = self.outcome();
        match outcome.winner {
            Some(winner) => tracing::info!(
                winner = winner.as_str(),
                rounds = outcome.rounds_played,
                "Battle finished"
            ),
            None => tracing::info!(rounds = outcome.rounds_played, "Battle hit the round cap"),
        }
        Ok(outcome)
    }

    /// Summarize the battle as it stands.
    pub fn outcome(&self) -> BattleOutcome {
        let state = self.engine.state();
        BattleOutcome {
            winner: state.winner,
            rounds_played: self.rounds_played(),
            seed: self.engine.seed(),
            state_hash: self.engine.state_hash(),
            log_entries: state.battle_log.len(),
        }
    }

    /// Hand back the engine.
    pub fn into_engine(self) -> BattleEngine {
        self.engine
    }
}

/// Play one round: start-of-round effects, one turn per living unit in
/// speed order, end-of-round effects, then the end check.
///
/// Units defeated earlier in the round skip their turn. Units that
/// cannot act forfeit it. A move with nobody to hit is not used.
///
/// Does nothing once the battle has a winner.
///
/// # Errors
///
/// Returns [`BattleError::UnknownUnit`] if the turn order names a unit
/// missing from the rosters.
pub fn play_round(engine: &mut BattleEngine, policy: Policy) -> Result<RoundSummary> {
    let round = engine.state().round;
    let log_start = engine.state().battle_log.len();
    if engine.state().winner.is_some() {
        return Ok(RoundSummary {
            round,
            turn_order: Vec::new(),
            log_start,
            is_over: true,
        });
    }

    engine.process_start_of_round();
    let turn_order = engine.determine_turn_order();
    tracing::debug!(round, units = turn_order.len(), "Turn order decided");

    for (index, &id) in turn_order.iter().enumerate() {
        engine.set_turn(index as u32 + 1);

        if !engine.state().try_unit(id)?.is_alive() {
            continue;
        }
        if !engine.can_act(id) {
            engine.forfeit_turn(id)?;
            continue;
        }

        let (state, rng) = engine.state_and_rng();
        let Some(plan) = plan_turn(policy, state, id, rng) else {
            tracing::debug!(unit = %id, "No valid targets, turn skipped");
            continue;
        };
        let outcome = engine.execute_move(plan.actor, plan.move_index, &plan.targets)?;
        if !outcome.executed() {
            tracing::debug!(unit = %id, ?outcome, "Move not executed");
        }
    }

    engine.process_end_of_round();
    let is_over = engine.check_battle_end();

    Ok(RoundSummary {
        round,
        turn_order,
        log_start,
        is_over,
    })
}
