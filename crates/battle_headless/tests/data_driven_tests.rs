//! Battles driven by the data files shipped in `assets/data`.

use std::path::PathBuf;

use battle_core::data::FALLBACK_ENEMY_STATS;
use battle_core::prelude::*;
use battle_headless::batch::{run_batch, verify_determinism, BatchConfig, Matchup};
use battle_headless::encounter::EncounterConfig;
use battle_headless::metrics::BattleReport;
use battle_headless::render;
use battle_headless::roster_loader::RosterRegistry;
use battle_headless::runner::{BattleRunner, RunnerConfig};
use battle_headless::strategies::Policy;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/data")
}

fn registry() -> RosterRegistry {
    RosterRegistry::load_from_directory(&data_dir()).expect("shipped data loads")
}

fn demo_matchup(registry: &RosterRegistry) -> Matchup {
    let ids = ["trapper", "sparkfin", "glowmoss"];
    Matchup {
        chart: registry.constants().type_chart.clone(),
        allies: registry.resolve(&ids).unwrap(),
        enemies: registry.enemy_party(&ids).unwrap(),
    }
}

#[test]
fn shipped_data_matches_fixtures() {
    let registry = registry();
    assert_eq!(registry.character_count(), 3);

    let fixtures = battle_test_utils::fixtures::sample_party();
    for fixture in &fixtures {
        let id = fixture.name.to_lowercase();
        let loaded = registry.get(&id).unwrap();
        assert_eq!(loaded.stats, fixture.stats, "{id} stats");
        assert_eq!(loaded.moves.len(), fixture.moves.len(), "{id} moves");
        for (a, b) in loaded.moves.iter().zip(&fixture.moves) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.power, b.power);
            assert_eq!(a.cooldown, b.cooldown);
            assert_eq!(a.keywords, b.keywords);
            assert_eq!(a.target, b.target);
        }
        assert_eq!(loaded.passive.rules, fixture.passive.rules, "{id} passive");
    }
    assert_eq!(
        registry.constants().type_chart,
        battle_test_utils::fixtures::sample_chart()
    );
}

#[test]
fn demo_battle_runs_to_an_end() {
    let registry = registry();
    let matchup = demo_matchup(&registry);
    let config = RunnerConfig::default().with_seed(42);

    let mut runner = BattleRunner::new(matchup.chart.clone(), config);
    runner.start(&matchup.allies, &matchup.enemies);
    let mut rounds_seen = 0;
    let outcome = runner
        .run_with(|_, summary| {
            rounds_seen += 1;
            assert_eq!(summary.round, rounds_seen);
        })
        .unwrap();

    assert!(outcome.rounds_played <= 10);
    assert_eq!(outcome.rounds_played, rounds_seen);

    let state = runner.engine().state();
    assert_eq!(state.battle_log.entries()[0].message, "Battle started!");
    if let Some(winner) = outcome.winner {
        assert!(state.is_wiped_out(winner.opponent()));
    }

    let report = BattleReport::new(config, runner.engine(), outcome.clone());
    assert_eq!(report.units.len(), 6);
    assert_eq!(report.log.len(), outcome.log_entries);
}

#[test]
fn report_round_trips_through_json() {
    let registry = registry();
    let matchup = demo_matchup(&registry);
    let config = RunnerConfig::default().with_seed(3);
    let mut runner = BattleRunner::new(matchup.chart.clone(), config);
    runner.start(&matchup.allies, &matchup.enemies);
    let outcome = runner.run_full_battle().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports/battle.json");
    BattleReport::new(config, runner.engine(), outcome.clone())
        .save(&path)
        .unwrap();

    let loaded = BattleReport::load(&path).unwrap();
    assert_eq!(loaded.outcome, outcome);
    assert_eq!(loaded.config, config);
}

#[test]
fn snapshot_file_resume_matches_direct_run() {
    let registry = registry();
    let matchup = demo_matchup(&registry);
    let config = RunnerConfig::default()
        .with_seed(11)
        .with_tie_break(TieBreak::Shuffle)
        .with_policy(Policy::RandomReady);

    let mut direct = BattleRunner::new(matchup.chart.clone(), config);
    direct.start(&matchup.allies, &matchup.enemies);
    let direct_outcome = direct.run_full_battle().unwrap();

    let mut paused = BattleRunner::new(matchup.chart.clone(), config.with_max_rounds(2));
    paused.start(&matchup.allies, &matchup.enemies);
    paused.run_full_battle().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("battle.bin");
    paused.engine().snapshot().save(&path).unwrap();

    let snapshot = BattleSnapshot::load(&path).unwrap();
    let mut resumed = BattleRunner::resume(matchup.chart.clone(), snapshot, config).unwrap();
    let resumed_outcome = resumed.run_full_battle().unwrap();

    assert_eq!(resumed_outcome, direct_outcome);
}

#[test]
fn batch_and_verify_on_shipped_data() {
    let registry = registry();
    let matchup = demo_matchup(&registry);

    let results = run_batch(&matchup, BatchConfig::new(16).with_seed(500));
    assert_eq!(results.battles.len(), 16);
    assert!(results.errors.is_empty());

    let report = verify_determinism(&matchup, RunnerConfig::default(), 500, 3).unwrap();
    assert!(report.is_deterministic());
    assert_eq!(report.hashes[0], results.battles[0].final_state_hash);
}

#[test]
fn card_and_chart_render_shipped_data() {
    let registry = registry();
    let card = render::character_card(registry.get("glowmoss").unwrap(), registry.constants());
    assert!(card.contains("Glowmoss — Lantern of the Grove"));
    assert!(card.contains("Exploration Perk: Lantern"));
    assert!(card.contains("Synergies: nature, light, sustain"));

    let chart = render::type_chart(registry.constants());
    for ty in ["nature", "water", "spark", "light"] {
        assert!(chart.contains(ty));
    }
}

#[test]
fn shipped_encounters_run_to_an_end() {
    let registry = registry();
    assert_eq!(registry.encounters().zones(), vec!["grove", "shallows"]);

    for zone in ["grove", "shallows"] {
        let config = RunnerConfig::default().with_seed(21);
        let mut runner = BattleRunner::new(registry.constants().type_chart.clone(), config);
        let encounter = runner
            .start_encounter(&registry, "trapper", zone, EncounterConfig::default())
            .unwrap();
        assert_eq!(encounter.allies.len(), 3);
        assert_eq!(encounter.allies[0].id, "trapper");
        assert_eq!(encounter.enemies.len(), 3);
        assert!(encounter.enemies.iter().all(|e| e.stats.hp > 0));

        let outcome = runner.run_with(|_, _| {}).unwrap();
        assert!(outcome.rounds_played <= config.max_rounds);
    }
}

#[test]
fn reef_eel_uses_fallback_stats() {
    let registry = registry();
    let eel = registry
        .encounters()
        .zone_pool("shallows")
        .find(|e| e.id == "reef_eel")
        .unwrap();
    assert_eq!(
        battle_headless::encounter::enemy_stats(registry.encounters(), "shallows", eel.rarity),
        FALLBACK_ENEMY_STATS
    );
}
