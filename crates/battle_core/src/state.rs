//! The battle data model.
//!
//! [`BattleState`] is the single source of truth for a battle in progress.
//! It is plain data: every rule lives in the engine and the unit
//! primitives. It serializes losslessly (list order included), which is
//! what snapshots and determinism checks rely on.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::log::{BattleLog, Scribe};
use crate::unit::{BattleUnit, Team, UnitId};

/// A field effect placed on one side of the battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terrain {
    /// Display name used in log messages.
    pub name: String,
    /// Rounds remaining.
    pub duration: u32,
}

impl Terrain {
    /// Create a terrain.
    #[must_use]
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// One terrain slot per side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TerrainSlots {
    /// Terrain on the ally side.
    pub ally: Option<Terrain>,
    /// Terrain on the enemy side.
    pub enemy: Option<Terrain>,
}

impl TerrainSlots {
    /// Terrain on a side.
    #[must_use]
    pub fn get(&self, side: Team) -> Option<&Terrain> {
        match side {
            Team::Ally => self.ally.as_ref(),
            Team::Enemy => self.enemy.as_ref(),
        }
    }

    /// Mutable slot for a side.
    pub fn slot_mut(&mut self, side: Team) -> &mut Option<Terrain> {
        match side {
            Team::Ally => &mut self.ally,
            Team::Enemy => &mut self.enemy,
        }
    }
}

/// Full state of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleState {
    /// Current round, starting at 1.
    pub round: u32,
    /// Turn counter within the round, set by the orchestrator.
    pub turn: u32,
    /// The player's party, in slot order.
    pub allies: Vec<BattleUnit>,
    /// The opposing party, in slot order.
    pub enemies: Vec<BattleUnit>,
    /// Terrain per side.
    pub terrain: TerrainSlots,
    /// Everything that happened so far.
    pub battle_log: BattleLog,
    /// Set once when one side is wiped out.
    pub winner: Option<Team>,
}

impl Default for BattleState {
    fn default() -> Self {
        Self {
            round: 1,
            turn: 0,
            allies: Vec::new(),
            enemies: Vec::new(),
            terrain: TerrainSlots::default(),
            battle_log: BattleLog::new(),
            winner: None,
        }
    }
}

impl BattleState {
    /// Create a round-1 state with the given rosters.
    #[must_use]
    pub fn new(allies: Vec<BattleUnit>, enemies: Vec<BattleUnit>) -> Self {
        Self {
            allies,
            enemies,
            ..Self::default()
        }
    }

    /// Units of one side.
    #[must_use]
    pub fn roster(&self, team: Team) -> &[BattleUnit] {
        match team {
            Team::Ally => &self.allies,
            Team::Enemy => &self.enemies,
        }
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&BattleUnit> {
        self.roster(id.team).get(id.slot)
    }

    /// Look up a unit mutably.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut BattleUnit> {
        match id.team {
            Team::Ally => self.allies.get_mut(id.slot),
            Team::Enemy => self.enemies.get_mut(id.slot),
        }
    }

    /// Look up a unit, failing with [`BattleError::UnknownUnit`].
    pub fn try_unit(&self, id: UnitId) -> Result<&BattleUnit> {
        self.unit(id).ok_or(BattleError::UnknownUnit(id))
    }

    /// Ids of every unit, allies first, in slot order.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.allies.len())
            .map(UnitId::ally)
            .chain((0..self.enemies.len()).map(UnitId::enemy))
    }

    /// Every non-defeated unit with its id, allies first.
    pub fn living_units(&self) -> impl Iterator<Item = (UnitId, &BattleUnit)> {
        let allies = self
            .allies
            .iter()
            .enumerate()
            .map(|(slot, unit)| (UnitId::ally(slot), unit));
        let enemies = self
            .enemies
            .iter()
            .enumerate()
            .map(|(slot, unit)| (UnitId::enemy(slot), unit));
        allies.chain(enemies).filter(|(_, unit)| unit.is_alive())
    }

    /// Ids of the living units of one side, in slot order.
    #[must_use]
    pub fn living_ids(&self, team: Team) -> Vec<UnitId> {
        self.living_units()
            .filter(|(id, _)| id.team == team)
            .map(|(id, _)| id)
            .collect()
    }

    /// Check if a side has no living units. An empty roster counts.
    #[must_use]
    pub fn is_wiped_out(&self, team: Team) -> bool {
        self.roster(team).iter().all(|unit| unit.is_defeated)
    }

    /// Log handle stamped with the current round and turn.
    pub fn scribe(&mut self) -> Scribe<'_> {
        Scribe::new(&mut self.battle_log, self.round, self.turn)
    }

    /// A unit and a log handle at the same time.
    pub fn unit_and_scribe(&mut self, id: UnitId) -> Option<(&mut BattleUnit, Scribe<'_>)> {
        let (round, turn) = (self.round, self.turn);
        let unit = match id.team {
            Team::Ally => self.allies.get_mut(id.slot)?,
            Team::Enemy => self.enemies.get_mut(id.slot)?,
        };
        Some((unit, Scribe::new(&mut self.battle_log, round, turn)))
    }

    /// Append a log line at the current round and turn.
    pub fn log(&mut self, message: impl Into<String>) {
        self.battle_log.push(self.round, self.turn, message);
    }

    /// Deterministic digest of the whole state.
    ///
    /// Two states with identical contents, including list ordering and the
    /// log, produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the state with bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::InvalidState(format!("Failed to serialize battle: {e}")))
    }

    /// Deserialize a state produced by [`BattleState::serialize`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid state.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| BattleError::InvalidState(format!("Failed to deserialize battle: {e}")))
    }
}
