//! Scripted move and target selection for headless battles.
//!
//! A [`Policy`] picks which move a unit uses; the move's
//! [`TargetMode`] then decides who it hits. Every random choice draws from
//! the engine's seeded RNG, so one seed fixes the whole battle.

use std::fmt;
use std::str::FromStr;

use battle_core::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a unit picks its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// First move off cooldown, falling back to slot 0.
    #[default]
    FirstReady,
    /// Any move off cooldown, chosen uniformly, falling back to slot 0.
    RandomReady,
}

impl Policy {
    /// Name as accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Policy::FirstReady => "first-ready",
            Policy::RandomReady => "random-ready",
        }
    }

    /// Pick a move slot for `unit`.
    ///
    /// Falls back to slot 0 when nothing is ready; the engine then logs the
    /// cooldown rejection.
    pub fn choose_move<R: Rng + ?Sized>(self, unit: &BattleUnit, rng: &mut R) -> usize {
        match self {
            Policy::FirstReady => unit.ready_moves().next().unwrap_or(0),
            Policy::RandomReady => {
                let ready: Vec<usize> = unit.ready_moves().collect();
                ready.choose(rng).copied().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "first-ready" | "first" => Ok(Policy::FirstReady),
            "random-ready" | "random" => Ok(Policy::RandomReady),
            other => Err(format!(
                "unknown policy '{other}' (expected first-ready or random-ready)"
            )),
        }
    }
}

/// One unit's decided action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    /// Acting unit.
    pub actor: UnitId,
    /// Move slot to use.
    pub move_index: usize,
    /// Units the move hits.
    pub targets: Vec<UnitId>,
}

/// Living units on `team`, minus `except`.
fn living_except(state: &BattleState, team: Team, except: Option<UnitId>) -> Vec<UnitId> {
    state
        .living_ids(team)
        .into_iter()
        .filter(|id| Some(*id) != except)
        .collect()
}

/// Resolve a targeting mode into concrete units.
///
/// Single-target modes pick uniformly among living candidates. A lone unit
/// using a `single_ally` move targets itself.
pub fn resolve_targets<R: Rng + ?Sized>(
    state: &BattleState,
    actor: UnitId,
    mode: TargetMode,
    rng: &mut R,
) -> Vec<UnitId> {
    let foes = actor.team.opponent();
    match mode {
        TargetMode::SingleEnemy => living_except(state, foes, None)
            .choose(rng)
            .copied()
            .into_iter()
            .collect(),
        TargetMode::AllEnemies => living_except(state, foes, None),
        TargetMode::SelfTarget => vec![actor],
        TargetMode::SingleAlly => {
            let pick = living_except(state, actor.team, Some(actor))
                .choose(rng)
                .copied();
            vec![pick.unwrap_or(actor)]
        }
        TargetMode::AllAllies => living_except(state, actor.team, None),
    }
}

/// Decide what `actor` does this turn.
///
/// Returns `None` if the actor is unknown or there is nobody to hit.
pub fn plan_turn<R: Rng + ?Sized>(
    policy: Policy,
    state: &BattleState,
    actor: UnitId,
    rng: &mut R,
) -> Option<TurnPlan> {
    let unit = state.unit(actor)?;
    let move_index = policy.choose_move(unit, rng);
    let mode = unit.moves.get(move_index).map(|m| m.target)?;
    let targets = resolve_targets(state, actor, mode, rng);
    if targets.is_empty() {
        return None;
    }
    Some(TurnPlan {
        actor,
        move_index,
        targets,
    })
}
