//! Speed-based turn ordering.
//!
//! Units act in descending speed. Equal speeds are resolved by a
//! [`TieBreak`] strategy; the shuffle variant draws from the engine's
//! seeded RNG so a seed fully determines the order.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::BattleState;
use crate::unit::UnitId;

/// How units with equal speed are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Keep roster order: allies before enemies, then slot order.
    #[default]
    Stable,
    /// Shuffle uniformly within each equal-speed group.
    Shuffle,
}

impl TieBreak {
    /// Lowercase label, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TieBreak::Stable => "stable",
            TieBreak::Shuffle => "shuffle",
        }
    }
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(TieBreak::Stable),
            "shuffle" => Ok(TieBreak::Shuffle),
            other => Err(format!("unknown tie-break '{other}' (expected stable|shuffle)")),
        }
    }
}

/// Order the living units of both rosters for this round.
///
/// The result is a permutation of the living units, non-increasing in
/// current speed.
pub fn determine_turn_order<R: Rng + ?Sized>(
    state: &BattleState,
    tie_break: TieBreak,
    rng: &mut R,
) -> Vec<UnitId> {
    let mut order: Vec<(UnitId, u32)> = state
        .living_units()
        .map(|(id, unit)| (id, unit.current_stats.speed))
        .collect();

    // Stable sort keeps roster order within a speed.
    order.sort_by(|a, b| b.1.cmp(&a.1));

    if tie_break == TieBreak::Shuffle {
        let mut start = 0;
        while start < order.len() {
            let speed = order[start].1;
            let end = order[start..]
                .iter()
                .position(|(_, s)| *s != speed)
                .map_or(order.len(), |offset| start + offset);
            order[start..end].shuffle(rng);
            start = end;
        }
    }

    order.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BaseStats, CharacterTemplate, PassiveData, TypeId};
    use crate::unit::{BattleUnit, Team};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit(name: &str, speed: u32, team: Team) -> BattleUnit {
        let template = CharacterTemplate {
            id: name.to_lowercase(),
            name: name.to_string(),
            types: vec![TypeId::new("stone")],
            stats: BaseStats {
                hp: 50,
                power: 10,
                defense: 10,
                magic_resist: 0,
                speed,
            },
            moves: Vec::new(),
            passive: PassiveData::default(),
            title: String::new(),
            role_primary: String::new(),
            role_secondary: None,
            rarity: String::new(),
            rank: 0,
            synergy_tags: Vec::new(),
            exploration_perk: None,
        };
        BattleUnit::from_template(&template, team)
    }

    fn state() -> BattleState {
        let mut state = BattleState::default();
        state.allies = vec![
            unit("A0", 30, Team::Ally),
            unit("A1", 50, Team::Ally),
            unit("A2", 30, Team::Ally),
        ];
        state.enemies = vec![unit("E0", 30, Team::Enemy), unit("E1", 80, Team::Enemy)];
        state
    }

    #[test]
    fn test_stable_keeps_roster_order_on_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let order = determine_turn_order(&state(), TieBreak::Stable, &mut rng);
        assert_eq!(
            order,
            vec![
                UnitId::enemy(1),
                UnitId::ally(1),
                UnitId::ally(0),
                UnitId::ally(2),
                UnitId::enemy(0),
            ]
        );
    }

    #[test]
    fn test_defeated_units_are_skipped() {
        let mut state = state();
        state.enemies[1].is_defeated = true;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let order = determine_turn_order(&state, TieBreak::Stable, &mut rng);
        assert_eq!(order.len(), 4);
        assert!(!order.contains(&UnitId::enemy(1)));
    }

    #[test]
    fn test_shuffle_only_permutes_within_speed_groups() {
        let state = state();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let order = determine_turn_order(&state, TieBreak::Shuffle, &mut rng);
            assert_eq!(order[0], UnitId::enemy(1));
            assert_eq!(order[1], UnitId::ally(1));
            let mut tail = order[2..].to_vec();
            tail.sort_by_key(|id| (id.team == Team::Enemy, id.slot));
            assert_eq!(tail, vec![UnitId::ally(0), UnitId::ally(2), UnitId::enemy(0)]);
        }
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let state = state();
        let first = determine_turn_order(
            &state,
            TieBreak::Shuffle,
            &mut ChaCha8Rng::seed_from_u64(99),
        );
        let second = determine_turn_order(
            &state,
            TieBreak::Shuffle,
            &mut ChaCha8Rng::seed_from_u64(99),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_reaches_other_orders() {
        let state = state();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            seen.insert(determine_turn_order(&state, TieBreak::Shuffle, &mut rng));
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_parse_tie_break() {
        assert_eq!("shuffle".parse::<TieBreak>(), Ok(TieBreak::Shuffle));
        assert!("random".parse::<TieBreak>().is_err());
    }
}
