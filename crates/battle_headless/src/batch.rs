//! Batch battle runner for balance testing.
//!
//! Runs many seeded battles in parallel using rayon. Each battle owns its
//! own engine, so nothing is shared between threads but the read-only
//! templates and type chart.

use std::path::{Path, PathBuf};
use std::time::Instant;

use battle_core::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, BattleMetrics};
use crate::runner::{BattleRunner, RunnerConfig};
use crate::strategies::Policy;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of battles to run.
    pub battle_count: u32,
    /// Maximum parallel battles (0 = use rayon default).
    pub parallel_battles: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
    /// Seed of the first battle; battle `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Settings shared by every battle. The seed is overridden per battle.
    pub runner: RunnerConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            battle_count: 100,
            parallel_battles: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            runner: RunnerConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for a number of battles.
    pub fn new(battle_count: u32) -> Self {
        Self {
            battle_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the shared runner settings.
    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    /// Set the move policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.runner.policy = policy;
        self
    }

    /// Runner settings for battle `index`.
    pub fn runner_for(&self, index: u32) -> RunnerConfig {
        self.runner
            .with_seed(self.seed_start.wrapping_add(u64::from(index)))
    }
}

/// The two parties every battle in a batch uses.
#[derive(Debug, Clone)]
pub struct Matchup {
    /// Type chart.
    pub chart: TypeChart,
    /// Ally party.
    pub allies: Vec<CharacterTemplate>,
    /// Enemy party.
    pub enemies: Vec<CharacterTemplate>,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual battle metrics, in seed order.
    pub battles: Vec<BattleMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Battle index.
    pub battle_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Run one battle to completion.
pub fn run_single_battle(
    matchup: &Matchup,
    config: RunnerConfig,
    battle_id: &str,
) -> battle_core::error::Result<(BattleMetrics, BattleEngine)> {
    let mut runner = BattleRunner::new(matchup.chart.clone(), config);
    runner.start(&matchup.allies, &matchup.enemies);
    let outcome = runner.run_full_battle()?;
    let engine = runner.into_engine();
    Ok((BattleMetrics::collect(battle_id, &engine, &outcome), engine))
}

/// Run a batch of battles.
pub fn run_batch(matchup: &Matchup, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        battles = config.battle_count,
        seed_start = config.seed_start,
        policy = %config.runner.policy,
        "Starting batch run"
    );

    if config.parallel_battles > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_battles as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<std::result::Result<BattleMetrics, BatchError>> = (0..config.battle_count)
        .into_par_iter()
        .map(|i| {
            let runner = config.runner_for(i);
            let seed = runner.seed.unwrap_or_default();
            match run_single_battle(matchup, runner, &format!("battle_{seed}")) {
                Ok((metrics, _)) => {
                    debug!(index = i, seed, winner = ?metrics.winner, "Battle complete");
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Battle {i} failed: {e}");
                    Err(BatchError {
                        battle_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (battles, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(std::result::Result::is_ok);
    let battles: Vec<BattleMetrics> = battles.into_iter().filter_map(std::result::Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(std::result::Result::err).collect();

    let summary = BatchSummary::from_battles(&battles);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} battles in {:.2}s ({:.1} battles/sec)",
        battles.len(),
        duration_seconds,
        battles.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        battles,
        summary,
        duration_seconds,
        errors,
    }
}

/// Result of replaying one seed several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismReport {
    /// Seed that was replayed.
    pub seed: u64,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
}

impl DeterminismReport {
    /// Check if every run ended in the same state.
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Replay one seed `runs` times and compare final state hashes and logs.
pub fn verify_determinism(
    matchup: &Matchup,
    config: RunnerConfig,
    seed: u64,
    runs: u32,
) -> battle_core::error::Result<DeterminismReport> {
    let config = config.with_seed(seed);
    let mut hashes = Vec::with_capacity(runs as usize);
    let mut first_log: Option<BattleLog> = None;

    for run in 0..runs {
        let (metrics, engine) = run_single_battle(matchup, config, &format!("verify_{run}"))?;
        let log = &engine.state().battle_log;
        match &first_log {
            Some(first) if first != log => {
                warn!(run, "Battle log diverged from the first run");
            }
            Some(_) => {}
            None => first_log = Some(log.clone()),
        }
        hashes.push(metrics.final_state_hash);
    }

    Ok(DeterminismReport { seed, hashes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_test_utils::fixtures::{mirror_party, sample_chart, sample_party};

    fn matchup() -> Matchup {
        let party = sample_party();
        Matchup {
            chart: sample_chart(),
            enemies: mirror_party(&party),
            allies: party,
        }
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.battle_count, 100);
        assert_eq!(config.runner.max_rounds, 10);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_policy(Policy::RandomReady);

        assert_eq!(config.battle_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.runner_for(3).seed, Some(12348));
        assert_eq!(config.runner_for(3).policy, Policy::RandomReady);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(&matchup(), BatchConfig::new(10).with_seed(100));

        assert_eq!(results.battles.len(), 10);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_battles, 10);
        assert_eq!(
            results.summary.ally_wins + results.summary.enemy_wins + results.summary.draws,
            10
        );
        let seeds: Vec<u64> = results.battles.iter().map(|b| b.seed).collect();
        assert_eq!(seeds, (100..110).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let a = run_batch(&matchup(), BatchConfig::new(8).with_seed(7));
        let b = run_batch(&matchup(), BatchConfig::new(8).with_seed(7));
        assert_eq!(a.battles, b.battles);
    }

    #[test]
    fn test_verify_determinism() {
        let report = verify_determinism(&matchup(), RunnerConfig::default(), 12345, 5).unwrap();
        assert_eq!(report.hashes.len(), 5);
        assert!(report.is_deterministic());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(&matchup(), BatchConfig::new(5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.battles.len(), 5);
        assert_eq!(loaded.config.battle_count, 5);
    }
}
