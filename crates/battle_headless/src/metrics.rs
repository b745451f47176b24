//! Battle metrics for balance analysis.
//!
//! [`BattleMetrics`] records one finished battle, [`BatchSummary`]
//! aggregates many, and [`BattleReport`] is the full JSON dump written by
//! `run --output`.

use std::path::Path;

use battle_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::runner::{BattleOutcome, RunnerConfig};

/// Final condition of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    /// Display name.
    pub name: String,
    /// Side.
    pub team: Team,
    /// Remaining hit points.
    pub current_hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Whether the unit was knocked out.
    pub is_defeated: bool,
}

impl UnitReport {
    /// Snapshot a unit.
    pub fn from_unit(unit: &BattleUnit) -> Self {
        Self {
            name: unit.name.clone(),
            team: unit.team,
            current_hp: unit.current_hp,
            max_hp: unit.max_hp,
            is_defeated: unit.is_defeated,
        }
    }
}

/// Metrics for a single battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleMetrics {
    /// Unique battle identifier.
    pub battle_id: String,
    /// Random seed used.
    pub seed: u64,
    /// Rounds fully played.
    pub rounds_played: u32,
    /// Winning side (None = draw).
    pub winner: Option<Team>,
    /// Living allies at the end.
    pub ally_survivors: u32,
    /// Living enemies at the end.
    pub enemy_survivors: u32,
    /// Remaining ally HP as a fraction of total ally max HP.
    pub ally_hp_fraction: f64,
    /// Remaining enemy HP as a fraction of total enemy max HP.
    pub enemy_hp_fraction: f64,
    /// Battle log length.
    pub log_entries: usize,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

fn team_hp_fraction(units: &[BattleUnit]) -> f64 {
    let max: u64 = units.iter().map(|u| u64::from(u.max_hp)).sum();
    if max == 0 {
        return 0.0;
    }
    let current: u64 = units.iter().map(|u| u64::from(u.current_hp)).sum();
    current as f64 / max as f64
}

impl BattleMetrics {
    /// Collect metrics from a finished battle.
    pub fn collect(
        battle_id: impl Into<String>,
        engine: &BattleEngine,
        outcome: &BattleOutcome,
    ) -> Self {
        let state = engine.state();
        Self {
            battle_id: battle_id.into(),
            seed: outcome.seed,
            rounds_played: outcome.rounds_played,
            winner: outcome.winner,
            ally_survivors: state.living_ids(Team::Ally).len() as u32,
            enemy_survivors: state.living_ids(Team::Enemy).len() as u32,
            ally_hp_fraction: team_hp_fraction(&state.allies),
            enemy_hp_fraction: team_hp_fraction(&state.enemies),
            log_entries: outcome.log_entries,
            final_state_hash: outcome.state_hash,
        }
    }
}

/// Aggregated statistics across multiple battles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total battles played.
    pub total_battles: u32,
    /// Battles won by the allies.
    pub ally_wins: u32,
    /// Battles won by the enemies.
    pub enemy_wins: u32,
    /// Battles that hit the round cap.
    pub draws: u32,
    /// Ally win rate.
    pub ally_win_rate: f64,
    /// Enemy win rate.
    pub enemy_win_rate: f64,
    /// Average battle length in rounds.
    pub avg_rounds: f64,
    /// Shortest battle.
    pub min_rounds: u32,
    /// Longest battle.
    pub max_rounds: u32,
    /// Average surviving allies in ally wins.
    pub avg_ally_survivors_on_win: f64,
    /// Average surviving enemies in enemy wins.
    pub avg_enemy_survivors_on_win: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of battle metrics.
    pub fn from_battles(battles: &[BattleMetrics]) -> Self {
        if battles.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_battles: battles.len() as u32,
            min_rounds: u32::MAX,
            ..Default::default()
        };

        let mut rounds_sum = 0u64;
        let mut ally_survivors = 0u64;
        let mut enemy_survivors = 0u64;

        for battle in battles {
            rounds_sum += u64::from(battle.rounds_played);
            summary.min_rounds = summary.min_rounds.min(battle.rounds_played);
            summary.max_rounds = summary.max_rounds.max(battle.rounds_played);

            match battle.winner {
                Some(Team::Ally) => {
                    summary.ally_wins += 1;
                    ally_survivors += u64::from(battle.ally_survivors);
                }
                Some(Team::Enemy) => {
                    summary.enemy_wins += 1;
                    enemy_survivors += u64::from(battle.enemy_survivors);
                }
                None => summary.draws += 1,
            }
        }

        let total = f64::from(summary.total_battles);
        summary.avg_rounds = rounds_sum as f64 / total;
        summary.ally_win_rate = f64::from(summary.ally_wins) / total;
        summary.enemy_win_rate = f64::from(summary.enemy_wins) / total;
        if summary.ally_wins > 0 {
            summary.avg_ally_survivors_on_win =
                ally_survivors as f64 / f64::from(summary.ally_wins);
        }
        if summary.enemy_wins > 0 {
            summary.avg_enemy_survivors_on_win =
                enemy_survivors as f64 / f64::from(summary.enemy_wins);
        }
        summary
    }

    /// Check if neither side wins more than `threshold` more often than
    /// the other (e.g. 0.1 = within ten points).
    pub fn is_balanced(&self, threshold: f64) -> bool {
        (self.ally_win_rate - self.enemy_win_rate).abs() <= threshold
    }
}

/// Everything about one battle, for `run --output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleReport {
    /// Runner settings.
    pub config: RunnerConfig,
    /// Result.
    pub outcome: BattleOutcome,
    /// Final unit condition, allies first.
    pub units: Vec<UnitReport>,
    /// Full battle log.
    pub log: Vec<LogEntry>,
}

impl BattleReport {
    /// Build a report from a finished engine.
    pub fn new(config: RunnerConfig, engine: &BattleEngine, outcome: BattleOutcome) -> Self {
        let state = engine.state();
        Self {
            config,
            outcome,
            units: state
                .allies
                .iter()
                .chain(&state.enemies)
                .map(UnitReport::from_unit)
                .collect(),
            log: state.battle_log.entries().to_vec(),
        }
    }

    /// Save the report as pretty JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a report from JSON.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battle(winner: Option<Team>, rounds: u32, survivors: u32) -> BattleMetrics {
        BattleMetrics {
            rounds_played: rounds,
            winner,
            ally_survivors: if winner == Some(Team::Ally) { survivors } else { 0 },
            enemy_survivors: if winner == Some(Team::Enemy) { survivors } else { 0 },
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_battles(&[]);
        assert_eq!(summary.total_battles, 0);
        assert_eq!(summary.min_rounds, 0);
    }

    #[test]
    fn test_summary_counts() {
        let battles = [
            battle(Some(Team::Ally), 4, 2),
            battle(Some(Team::Ally), 6, 1),
            battle(Some(Team::Enemy), 5, 3),
            battle(None, 10, 0),
        ];
        let summary = BatchSummary::from_battles(&battles);

        assert_eq!(summary.total_battles, 4);
        assert_eq!(summary.ally_wins, 2);
        assert_eq!(summary.enemy_wins, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.min_rounds, 4);
        assert_eq!(summary.max_rounds, 10);
        assert!((summary.avg_rounds - 6.25).abs() < 1e-9);
        assert!((summary.ally_win_rate - 0.5).abs() < 1e-9);
        assert!((summary.avg_ally_survivors_on_win - 1.5).abs() < 1e-9);
        assert!((summary.avg_enemy_survivors_on_win - 3.0).abs() < 1e-9);
        assert!(!summary.is_balanced(0.1));
        assert!(summary.is_balanced(0.25));
    }

    #[test]
    fn test_hp_fraction() {
        let mut unit = BattleUnit::from_template(
            &battle_test_utils::fixtures::dummy("Dummy", 100, 10),
            Team::Ally,
        );
        unit.current_hp = 25;
        assert!((team_hp_fraction(&[unit]) - 0.25).abs() < 1e-9);
        assert_eq!(team_hp_fraction(&[]), 0.0);
    }
}
