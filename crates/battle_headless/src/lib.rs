//! Headless battle runner for scripted playtests and CI verification.
//!
//! This crate drives [`battle_core`] without any UI:
//!
//! - **Scripted battles**: The demo AI picks moves and targets for both
//!   sides, one round at a time
//! - **Batches**: Many seeded battles in parallel for balance numbers
//! - **Determinism checks**: Replaying a seed must give the same state hash
//! - **Snapshots**: Save a battle mid-way and resume it later
//! - **Encounters**: A hero and random companions against a zone's enemies
//!
//! Character and constants data are loaded from RON or JSON files (see
//! [`roster_loader`]). Terminal output lives in [`render`].
//!
//! # Example
//!
//! ```bash
//! # One battle, printed round by round
//! cargo run -p battle_headless -- run --allies trapper,sparkfin,glowmoss \
//!     --enemies trapper,sparkfin,glowmoss --seed 7
//!
//! # 1000 seeded battles
//! cargo run -p battle_headless -- batch --count 1000 --seed 0 --output results/
//!
//! # Verify determinism
//! cargo run -p battle_headless -- verify --seed 12345 --runs 5
//!
//! # Generated encounter in a zone
//! cargo run -p battle_headless -- encounter --hero trapper --zone grove --seed 3
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod encounter;
pub mod metrics;
pub mod render;
pub mod roster_loader;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, Matchup};
pub use encounter::{build_encounter, Encounter, EncounterConfig, EncounterError};
pub use metrics::{BatchSummary, BattleMetrics, BattleReport};
pub use roster_loader::{default_data_dir, load_roster_from_path, RosterLoadError, RosterRegistry};
pub use runner::{play_round, BattleOutcome, BattleRunner, RoundSummary, RunnerConfig};
pub use strategies::{Policy, TurnPlan};
