//! Headless battle runner.
//!
//! Runs scripted battles without any UI. Battle narration goes to stdout;
//! diagnostics go to stderr through `tracing`.
//!
//! # Usage
//!
//! ```bash
//! # One battle with the demo parties
//! cargo run -p battle_headless -- run --seed 42
//!
//! # Stop after three rounds and save, then finish later
//! cargo run -p battle_headless -- run --seed 42 --max-rounds 3 --snapshot battle.bin
//! cargo run -p battle_headless -- resume --snapshot battle.bin
//!
//! # Balance batch
//! cargo run -p battle_headless -- batch --count 1000 --seed 0 --output results/
//!
//! # Determinism check
//! cargo run -p battle_headless -- verify --seed 12345 --runs 5
//!
//! # Trapper plus two random companions against the grove's enemies
//! cargo run -p battle_headless -- encounter --hero trapper --zone grove --seed 3
//!
//! # Character card and type chart
//! cargo run -p battle_headless -- card trapper
//! cargo run -p battle_headless -- chart
//! ```

use std::fmt::Display;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_core::prelude::*;
use battle_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, Matchup},
    encounter::EncounterConfig,
    metrics::BattleReport,
    render,
    roster_loader::{load_roster_from_path, RosterRegistry},
    runner::{BattleOutcome, BattleRunner, RunnerConfig, DEFAULT_MAX_ROUNDS},
    strategies::Policy,
};

const DEFAULT_PARTY: &str = "trapper,sparkfin,glowmoss";

#[derive(Parser)]
#[command(name = "battle-headless")]
#[command(about = "Headless turn-based battle runner for playtests and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (defaults to $BATTLE_DATA_DIR or assets/data)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command that plays battles.
#[derive(Args, Clone)]
struct BattleArgs {
    /// Ally character ids, comma separated
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_PARTY)]
    allies: Vec<String>,

    /// Enemy character ids, comma separated
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_PARTY)]
    enemies: Vec<String>,

    /// Rounds before the battle is called a draw
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: u32,

    /// Turn-order tie-break: stable or shuffle
    #[arg(long, default_value = "stable")]
    tie_break: TieBreak,

    /// Move policy: first-ready or random-ready
    #[arg(long, default_value = "first-ready")]
    policy: Policy,
}

impl BattleArgs {
    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::default()
            .with_max_rounds(self.max_rounds)
            .with_tie_break(self.tie_break)
            .with_policy(self.policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle and print it round by round
    Run {
        #[command(flatten)]
        battle: BattleArgs,

        /// Random seed (entropy if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save a snapshot here when the run stops
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Run a batch of seeded battles for balance testing
    Batch {
        #[command(flatten)]
        battle: BattleArgs,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel battles (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Verify determinism by replaying one seed several times
    Verify {
        #[command(flatten)]
        battle: BattleArgs,

        /// Random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(long, default_value = "5")]
        runs: u32,
    },

    /// Generate an encounter in a zone and play it
    Encounter {
        /// Hero character id; always in the party
        #[arg(long, default_value = "trapper")]
        hero: String,

        /// Zone whose enemy pool to draw from
        #[arg(long, default_value = "grove")]
        zone: String,

        /// Rounds before the battle is called a draw
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,

        /// Turn-order tie-break: stable or shuffle
        #[arg(long, default_value = "stable")]
        tie_break: TieBreak,

        /// Move policy: first-ready or random-ready
        #[arg(long, default_value = "first-ready")]
        policy: Policy,

        /// Random seed (entropy if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save a snapshot here when the run stops
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Continue a saved battle
    Resume {
        /// Snapshot file to load
        #[arg(long)]
        snapshot: PathBuf,

        /// Rounds before the battle is called a draw (counted from round 1)
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,

        /// Move policy: first-ready or random-ready
        #[arg(long, default_value = "first-ready")]
        policy: Policy,

        /// Write a JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save a new snapshot here when the run stops
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print a character card
    Card {
        /// Character id
        id: String,
    },

    /// Print the type effectiveness chart
    Chart,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let registry = match load_roster_from_path(cli.data.as_deref()) {
        Ok(registry) => registry,
        Err(e) => fatal("Failed to load battle data", &e),
    };

    match cli.command {
        Commands::Run {
            battle,
            seed,
            output,
            snapshot,
        } => cmd_run(&registry, &battle, seed, output, snapshot),
        Commands::Batch {
            battle,
            count,
            parallel,
            seed,
            output,
        } => cmd_batch(&registry, &battle, count, parallel, seed, &output),
        Commands::Verify { battle, seed, runs } => cmd_verify(&registry, &battle, seed, runs),
        Commands::Encounter {
            hero,
            zone,
            max_rounds,
            tie_break,
            policy,
            seed,
            output,
            snapshot,
        } => {
            let config = RunnerConfig {
                max_rounds,
                seed,
                tie_break,
                policy,
            };
            cmd_encounter(&registry, &hero, &zone, config, output, snapshot);
        }
        Commands::Resume {
            snapshot,
            max_rounds,
            policy,
            output,
            save,
        } => {
            let config = RunnerConfig::default()
                .with_max_rounds(max_rounds)
                .with_policy(policy);
            cmd_resume(&registry, &snapshot, config, output, save);
        }
        Commands::Card { id } => cmd_card(&registry, &id),
        Commands::Chart => println!("{}", render::type_chart(registry.constants())),
    }
}

/// Log an error and exit with status 1.
fn fatal(context: &str, error: &dyn Display) -> ! {
    tracing::error!(error = %error, "{context}");
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn matchup(registry: &RosterRegistry, battle: &BattleArgs) -> Matchup {
    let allies = registry
        .resolve(&battle.allies)
        .unwrap_or_else(|e| fatal("Invalid ally party", &e));
    let enemies = registry
        .enemy_party(&battle.enemies)
        .unwrap_or_else(|e| fatal("Invalid enemy party", &e));
    Matchup {
        chart: registry.constants().type_chart.clone(),
        allies,
        enemies,
    }
}

/// Play a battle to its end, printing every round.
fn play(runner: &mut BattleRunner) -> BattleOutcome {
    println!("\n========== BATTLE START ==========");
    let result = runner.run_with(|engine, summary| {
        let state = engine.state();
        println!("\n--- ROUND {} ---", summary.round);
        println!("{}", render::turn_order(state, &summary.turn_order));
        println!("\n{}", render::hp_status(state));
    });
    let outcome = result.unwrap_or_else(|e| fatal("Battle aborted", &e));

    println!("{}", render::outcome_banner(&outcome));
    println!("\n========== BATTLE LOG ==========");
    print!("{}", render::battle_log(runner.engine().state().battle_log.entries()));
    outcome
}

fn finish(
    runner: &BattleRunner,
    config: RunnerConfig,
    outcome: BattleOutcome,
    output: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) {
    if let Some(path) = snapshot {
        if let Err(e) = runner.engine().snapshot().save(&path) {
            fatal("Failed to save snapshot", &e);
        }
        tracing::info!(path = %path.display(), "Snapshot saved");
    }

    if let Some(path) = output {
        let report = BattleReport::new(config, runner.engine(), outcome);
        if let Err(e) = report.save(&path) {
            fatal("Failed to save report", &e);
        }
        tracing::info!(path = %path.display(), "Report saved");
    }
}

/// Run a single battle.
fn cmd_run(
    registry: &RosterRegistry,
    battle: &BattleArgs,
    seed: Option<u64>,
    output: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) {
    let matchup = matchup(registry, battle);
    let mut config = battle.runner_config();
    config.seed = seed;

    let mut runner = BattleRunner::new(matchup.chart, config);
    runner.start(&matchup.allies, &matchup.enemies);
    tracing::info!(
        seed = runner.engine().seed(),
        policy = %config.policy,
        tie_break = config.tie_break.as_str(),
        "Battle configured"
    );

    let outcome = play(&mut runner);
    config.seed = Some(outcome.seed);
    finish(&runner, config, outcome, output, snapshot);
}

/// Generate an encounter and play it.
fn cmd_encounter(
    registry: &RosterRegistry,
    hero: &str,
    zone: &str,
    mut config: RunnerConfig,
    output: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) {
    let mut runner = BattleRunner::new(registry.constants().type_chart.clone(), config);
    let encounter = runner
        .start_encounter(registry, hero, zone, EncounterConfig::default())
        .unwrap_or_else(|e| fatal("Failed to build encounter", &e));

    let names = |party: &[CharacterTemplate]| {
        party
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(
        "Zone: {} (tier {})",
        encounter.zone,
        encounter.tier.as_deref().unwrap_or("none")
    );
    println!("Party:   {}", names(&encounter.allies));
    println!("Enemies: {}", names(&encounter.enemies));

    let outcome = play(&mut runner);
    config.seed = Some(outcome.seed);
    finish(&runner, config, outcome, output, snapshot);
}

/// Continue a saved battle.
fn cmd_resume(
    registry: &RosterRegistry,
    snapshot: &Path,
    config: RunnerConfig,
    output: Option<PathBuf>,
    save: Option<PathBuf>,
) {
    let saved =
        BattleSnapshot::load(snapshot).unwrap_or_else(|e| fatal("Failed to load snapshot", &e));
    let chart = registry.constants().type_chart.clone();
    let mut runner = BattleRunner::resume(chart, saved, config)
        .unwrap_or_else(|e| fatal("Failed to restore battle", &e));

    if !runner.can_continue() {
        tracing::warn!(
            round = runner.engine().state().round,
            max_rounds = runner.max_rounds(),
            "Battle is already over or past the round cap"
        );
    }

    let outcome = play(&mut runner);
    let config = RunnerConfig {
        seed: Some(outcome.seed),
        tie_break: runner.engine().config().tie_break,
        ..config
    };
    finish(&runner, config, outcome, output, save);
}

/// Run a batch of battles for balance testing.
fn cmd_batch(
    registry: &RosterRegistry,
    battle: &BattleArgs,
    count: u32,
    parallel: u32,
    seed: u64,
    output: &Path,
) {
    let matchup = matchup(registry, battle);

    tracing::info!(
        count,
        parallel,
        seed,
        allies = ?battle.allies,
        enemies = ?battle.enemies,
        output = %output.display(),
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(output) {
        fatal(&format!("Cannot create output directory '{}'", output.display()), &e);
    }

    let config = BatchConfig {
        battle_count: count,
        parallel_battles: parallel,
        output_dir: output.to_path_buf(),
        seed_start: seed,
        runner: battle.runner_config(),
    };
    let results = run_batch(&matchup, config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        fatal("Failed to save results", &e);
    }

    let s = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles played: {}", results.battles.len());
    if !results.errors.is_empty() {
        eprintln!("Battles failed: {}", results.errors.len());
    }
    eprintln!("Ally wins:  {} ({:.1}%)", s.ally_wins, s.ally_win_rate * 100.0);
    eprintln!("Enemy wins: {} ({:.1}%)", s.enemy_wins, s.enemy_win_rate * 100.0);
    eprintln!("Draws:      {}", s.draws);
    eprintln!(
        "Rounds: avg {:.2}, min {}, max {}",
        s.avg_rounds, s.min_rounds, s.max_rounds
    );
    eprintln!("Duration: {:.2}s", results.duration_seconds);
    eprintln!("Results: {}", results_path.display());
}

/// Verify determinism by replaying one seed.
fn cmd_verify(registry: &RosterRegistry, battle: &BattleArgs, seed: u64, runs: u32) {
    tracing::info!(seed, runs, "Verifying determinism");

    let matchup = matchup(registry, battle);
    let report = verify_determinism(&matchup, battle.runner_config(), seed, runs)
        .unwrap_or_else(|e| fatal("Battle aborted", &e));

    if report.is_deterministic() {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected! Hashes: {:?}", report.hashes);
        std::process::exit(1);
    }
}

/// Print a character card.
fn cmd_card(registry: &RosterRegistry, id: &str) {
    match registry.get(id) {
        Some(template) => print!("{}", render::character_card(template, registry.constants())),
        None => {
            let known: Vec<&str> = registry.ids().collect();
            fatal(
                &format!("Character not found (known: {})", known.join(", ")),
                &id,
            );
        }
    }
}
