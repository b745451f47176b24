//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded battle must replay bit-for-bit. Sources of non-determinism
//! include:
//!
//! - **System randomness**: Tie-breaks and scripted targeting draw from the
//!   engine's seeded `ChaCha8Rng`, never from thread RNGs.
//!
//! - **Map iteration order**: The type chart and constants tables are
//!   `BTreeMap`s; rosters are `Vec`s in slot order.
//!
//! - **Floating-point math**: The damage formula uses `f64` with a single
//!   `floor`, which is reproducible on every IEEE 754 platform.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use battle_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps played per run.
    pub steps: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play one round with a fixed script: every unit that can act uses its
/// first ready move on the first living opponent (or itself, for
/// supportive moves). Area moves hit every living unit on their side.
///
/// Targeting never draws from the RNG, so the only randomness left is the
/// engine's own turn-order tie-break. Orchestrators with their own
/// targeting rules plug in through [`verify_battle_determinism_with`].
///
/// Does nothing once a winner is set. Returns whether the battle is over.
///
/// # Panics
///
/// Panics if the engine reports an unknown unit, which would mean the
/// turn order and the rosters disagree.
pub fn play_scripted_round(engine: &mut BattleEngine) -> bool {
    if engine.state().winner.is_some() {
        return true;
    }

    engine.process_start_of_round();
    let order = engine.determine_turn_order();

    for (index, id) in order.into_iter().enumerate() {
        engine.set_turn(index as u32 + 1);
        if !engine.can_act(id) {
            if engine.state().unit(id).is_some_and(BattleUnit::is_alive) {
                engine.forfeit_turn(id).expect("unit in turn order exists");
            }
            continue;
        }

        let state = engine.state();
        let Some(unit) = state.unit(id) else { continue };
        let move_index = unit.ready_moves().next().unwrap_or(0);
        let Some(mv) = unit.moves.get(move_index) else {
            continue;
        };
        let foes = state.living_ids(id.team.opponent());
        let friends = state.living_ids(id.team);
        let targets = match mv.target {
            TargetMode::SingleEnemy => foes.into_iter().take(1).collect(),
            TargetMode::AllEnemies => foes,
            TargetMode::SelfTarget | TargetMode::SingleAlly => vec![id],
            TargetMode::AllAllies => friends,
        };
        if targets.is_empty() {
            continue;
        }
        engine
            .execute_move(id, move_index, &targets)
            .expect("scripted targets exist");
    }

    engine.process_end_of_round();
    engine.check_battle_end()
}

/// Play scripted rounds until the battle ends or `max_rounds` is reached.
pub fn play_scripted_battle(engine: &mut BattleEngine, max_rounds: u32) {
    for _ in 0..max_rounds {
        if play_scripted_round(engine) {
            break;
        }
    }
}

/// Replay a scripted battle `runs` times and compare final state hashes.
pub fn verify_battle_determinism<F>(setup_fn: F, runs: usize, max_rounds: u32) -> DeterminismResult
where
    F: Fn() -> BattleEngine,
{
    verify_battle_determinism_with(setup_fn, runs, max_rounds, |engine| {
        play_scripted_round(engine);
    })
}

/// Replay a battle `runs` times with a caller-supplied round driver and
/// compare final state hashes.
///
/// `step_round` plays one round; it is called `max_rounds` times per run
/// and must tolerate being called after the battle has ended.
pub fn verify_battle_determinism_with<F, S>(
    setup_fn: F,
    runs: usize,
    max_rounds: u32,
    step_round: S,
) -> DeterminismResult
where
    F: Fn() -> BattleEngine,
    S: Fn(&mut BattleEngine),
{
    verify_determinism(runs, max_rounds, setup_fn, step_round, BattleEngine::state_hash)
}

/// Compare two scripted runs round-by-round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(round)` at the first round
/// whose resulting states differ (0 means the setups already differ).
pub fn find_first_divergence<F>(setup_fn: F, max_rounds: u32) -> Option<u32>
where
    F: Fn() -> BattleEngine,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for round in 1..=max_rounds {
        play_scripted_round(&mut first);
        play_scripted_round(&mut second);

        if first.state_hash() != second.state_hash() {
            tracing::warn!(round, "Scripted battles diverged");
            return Some(round);
        }
    }

    None
}

/// Verify that snapshotting mid-battle and resuming matches playing on.
///
/// Plays `rounds_before` rounds, snapshots through bincode bytes, then
/// plays `rounds_after` rounds on both the original and the restored
/// engine.
pub fn verify_snapshot_determinism<F>(setup_fn: F, rounds_before: u32, rounds_after: u32) -> bool
where
    F: Fn() -> BattleEngine,
{
    let mut engine = setup_fn();
    for _ in 0..rounds_before {
        play_scripted_round(&mut engine);
    }

    let Ok(bytes) = engine.snapshot().to_bytes() else {
        return false;
    };
    let Ok(snapshot) = BattleSnapshot::from_bytes(&bytes) else {
        return false;
    };
    let Ok(mut restored) = BattleEngine::restore(engine.chart().clone(), snapshot) else {
        return false;
    };

    for _ in 0..rounds_after {
        play_scripted_round(&mut engine);
        play_scripted_round(&mut restored);
    }

    engine.state() == restored.state()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle property tests.
pub mod strategies {
    use battle_core::prelude::*;
    use proptest::prelude::*;

    /// Stats in the range the demo characters use.
    pub fn arb_base_stats() -> impl Strategy<Value = BaseStats> {
        (1u32..300, 0u32..120, 0u32..120, 0u32..80, 0u32..120).prop_map(
            |(hp, power, defense, magic_resist, speed)| BaseStats {
                hp,
                power,
                defense,
                magic_resist,
                speed,
            },
        )
    }

    /// Any status kind.
    pub fn arb_status_kind() -> impl Strategy<Value = StatusKind> {
        prop_oneof![
            Just(StatusKind::Poison),
            Just(StatusKind::Burn),
            Just(StatusKind::Stun),
            Just(StatusKind::Sleep),
            Just(StatusKind::Freeze),
            Just(StatusKind::Regen),
            Just(StatusKind::Buff),
            Just(StatusKind::Debuff),
            Just(StatusKind::HealingBuff),
        ]
    }

    /// A stat reference for buffs and debuffs.
    pub fn arb_stat() -> impl Strategy<Value = Stat> {
        prop_oneof![
            Just(Stat::Hp),
            Just(Stat::Power),
            Just(Stat::Defense),
            Just(Stat::MagicResist),
            Just(Stat::Speed),
        ]
    }

    /// A status with a random payload.
    pub fn arb_status_effect() -> impl Strategy<Value = StatusEffect> {
        (
            arb_status_kind(),
            1u32..5,
            proptest::option::of(arb_stat()),
            proptest::option::of(1u32..30),
            proptest::option::of(1u32..30),
        )
            .prop_map(|(kind, duration, stat, damage_per_turn, amount)| StatusEffect {
                kind,
                duration,
                stat,
                damage_per_turn,
                amount,
            })
    }

    /// A list of shields.
    pub fn arb_shields() -> impl Strategy<Value = Vec<Shield>> {
        proptest::collection::vec(
            (0u32..60, 1u32..4).prop_map(|(amount, duration)| Shield::new(amount, duration)),
            0..4,
        )
    }

    /// A living unit with random stats, HP, statuses and shields.
    ///
    /// Statuses are deduplicated by kind.
    pub fn arb_battle_unit() -> impl Strategy<Value = BattleUnit> {
        (
            arb_base_stats(),
            any::<prop::sample::Index>(),
            proptest::collection::vec(arb_status_effect(), 0..5),
            arb_shields(),
        )
            .prop_map(|(stats, hp_index, statuses, shields)| {
                let template = crate::fixtures::character(
                    "Subject",
                    &["stone"],
                    stats,
                    vec![crate::fixtures::move_template(
                        "Tackle",
                        20,
                        "stone",
                        0,
                        &[Keyword::Damage],
                        TargetMode::SingleEnemy,
                    )],
                );
                let mut unit = BattleUnit::from_template(&template, Team::Ally);
                unit.current_hp = 1 + hp_index.index(stats.hp as usize) as u32;
                for status in statuses {
                    if !unit.has_status(status.kind) {
                        unit.statuses.push(status);
                    }
                }
                unit.shields = shields;
                unit
            })
    }

    /// A roster of speeds for turn-order tests.
    pub fn arb_speeds() -> impl Strategy<Value = Vec<u32>> {
        proptest::collection::vec(0u32..5, 1..8)
    }
}
