//! Encounter generation.
//!
//! Builds both sides of a battle from loaded data: the hero plus a few
//! randomly chosen companions, against a zone's enemies with stats taken
//! from the zone's tier. Every random choice comes from the caller's RNG,
//! normally the engine's, so one seed decides the encounter and the battle.

use battle_core::data::{
    BaseStats, CharacterTemplate, EncounterTable, EnemyTemplate, Rarity, FALLBACK_ENEMY_STATS,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster_loader::RosterRegistry;

/// Errors that can occur while building an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    /// The hero id is not in the registry.
    #[error("Hero '{0}' not found in character data")]
    UnknownHero(String),

    /// No enemy lists the zone.
    #[error("No enemies found for zone '{0}'")]
    EmptyZone(String),
}

/// Party and enemy composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Companions drawn to join the hero.
    pub companions: usize,
    /// Common or uncommon enemies drawn before the leader.
    pub fillers: usize,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            companions: 2,
            fillers: 2,
        }
    }
}

/// A generated matchup.
#[derive(Debug, Clone, PartialEq)]
pub struct Encounter {
    /// Zone the enemies were drawn from.
    pub zone: String,
    /// The zone's tier, if the table assigns one.
    pub tier: Option<String>,
    /// Hero first, then companions.
    pub allies: Vec<CharacterTemplate>,
    /// Fillers first, then the leader.
    pub enemies: Vec<CharacterTemplate>,
}

/// Pick the hero and up to `config.companions` other characters.
///
/// # Errors
///
/// Returns [`EncounterError::UnknownHero`] if `hero` is not loaded.
pub fn select_party<R: Rng + ?Sized>(
    registry: &RosterRegistry,
    hero: &str,
    config: EncounterConfig,
    rng: &mut R,
) -> Result<Vec<CharacterTemplate>, EncounterError> {
    let leader = registry
        .get(hero)
        .ok_or_else(|| EncounterError::UnknownHero(hero.to_string()))?;

    let mut companions: Vec<&str> = registry.ids().filter(|id| *id != hero).collect();
    companions.shuffle(rng);
    companions.truncate(config.companions);

    let mut party = vec![leader.clone()];
    party.extend(companions.into_iter().filter_map(|id| registry.get(id)).cloned());
    Ok(party)
}

/// Stats for an enemy of `rarity` in `zone`.
///
/// Falls back to [`FALLBACK_ENEMY_STATS`] when the zone has no tier or
/// the tier has no line for the rarity.
pub fn enemy_stats(table: &EncounterTable, zone: &str, rarity: Rarity) -> BaseStats {
    table.tier_stats_for(zone, rarity).unwrap_or_else(|| {
        tracing::warn!(
            zone,
            tier = table.tier(zone).unwrap_or("none"),
            %rarity,
            "No tier stats, using defaults"
        );
        FALLBACK_ENEMY_STATS
    })
}

/// Draw a zone's enemies: `config.fillers` common or uncommon enemies,
/// then one rare or elite leader.
///
/// A zone with no rare or elite enemy gets a second draw from the fillers
/// as its leader, which may repeat an enemy already chosen. A zone with
/// fewer fillers than requested yields fewer.
///
/// # Errors
///
/// Returns [`EncounterError::EmptyZone`] if no enemy lists `zone`.
pub fn select_enemies<R: Rng + ?Sized>(
    table: &EncounterTable,
    zone: &str,
    config: EncounterConfig,
    rng: &mut R,
) -> Result<Vec<CharacterTemplate>, EncounterError> {
    let (leaders, fillers): (Vec<&EnemyTemplate>, Vec<&EnemyTemplate>) =
        table.zone_pool(zone).partition(|e| e.rarity.is_leader());
    if leaders.is_empty() && fillers.is_empty() {
        return Err(EncounterError::EmptyZone(zone.to_string()));
    }

    let mut picked = fillers.clone();
    picked.shuffle(rng);
    picked.truncate(config.fillers);

    let leader = if leaders.is_empty() {
        tracing::debug!(zone, "No rare or elite enemy, leader drawn from fillers");
        fillers.choose(rng)
    } else {
        leaders.choose(rng)
    };
    picked.extend(leader.copied());

    Ok(picked
        .into_iter()
        .map(|enemy| enemy.to_character(enemy_stats(table, zone, enemy.rarity)))
        .collect())
}

/// Build a full encounter: party first, then enemies, from the same RNG.
///
/// # Errors
///
/// Returns an error if the hero is unknown or the zone has no enemies.
pub fn build_encounter<R: Rng + ?Sized>(
    registry: &RosterRegistry,
    hero: &str,
    zone: &str,
    config: EncounterConfig,
    rng: &mut R,
) -> Result<Encounter, EncounterError> {
    let allies = select_party(registry, hero, config, rng)?;
    let table = registry.encounters();
    let enemies = select_enemies(table, zone, config, rng)?;
    tracing::info!(
        hero,
        zone,
        allies = allies.len(),
        enemies = enemies.len(),
        "Encounter built"
    );
    Ok(Encounter {
        zone: zone.to_string(),
        tier: table.tier(zone).map(str::to_string),
        allies,
        enemies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::data::{Keyword, PassiveData, TargetMode, TypeId};
    use battle_test_utils::fixtures::{move_template, sample_constants, sample_party};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats(hp: u32, power: u32, defense: u32, speed: u32) -> BaseStats {
        BaseStats {
            hp,
            power,
            defense,
            magic_resist: 0,
            speed,
        }
    }

    fn enemy(id: &str, name: &str, zone: &str, rarity: Rarity, ty: &str) -> EnemyTemplate {
        EnemyTemplate {
            id: id.to_string(),
            name: name.to_string(),
            zone: zone.to_string(),
            rarity,
            types: vec![TypeId::new(ty)],
            moves: vec![move_template(
                "Strike",
                25,
                ty,
                0,
                &[Keyword::Damage],
                TargetMode::SingleEnemy,
            )],
            passive: PassiveData::default(),
            role: String::new(),
        }
    }

    fn table() -> EncounterTable {
        EncounterTable {
            zone_tiers: [
                ("grove".to_string(), "tier1".to_string()),
                ("shallows".to_string(), "tier2".to_string()),
            ]
            .into(),
            tier_stats: [
                (
                    "tier1".to_string(),
                    [
                        (Rarity::Common, stats(70, 30, 20, 30)),
                        (Rarity::Uncommon, stats(85, 34, 24, 35)),
                        (Rarity::Rare, stats(130, 45, 30, 40)),
                    ]
                    .into(),
                ),
                ("tier2".to_string(), [(Rarity::Common, stats(90, 40, 28, 45))].into()),
            ]
            .into(),
            enemies: vec![
                enemy("sprite", "Bramble Sprite", "grove", Rarity::Common, "nature"),
                enemy("toad", "Mire Toad", "grove", Rarity::Uncommon, "water"),
                enemy("beetle", "Moss Beetle", "grove", Rarity::Common, "nature"),
                enemy("boar", "Thornback Boar", "grove", Rarity::Rare, "nature"),
                enemy("wisp", "Lamp Wisp", "grove", Rarity::Elite, "light"),
                enemy("crab", "Tide Crab", "shallows", Rarity::Common, "water"),
                enemy("eel", "Reef Eel", "shallows", Rarity::Uncommon, "spark"),
            ],
        }
    }

    fn registry() -> RosterRegistry {
        let mut registry = RosterRegistry::new(sample_constants());
        for mut template in sample_party() {
            template.id = template.name.to_lowercase();
            registry.insert(template);
        }
        registry.set_encounters(table());
        registry
    }

    fn rarity_of(enemy: &CharacterTemplate) -> &str {
        enemy.rarity.as_str()
    }

    #[test]
    fn test_party_is_hero_plus_two_companions() {
        let registry = registry();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let party =
                select_party(&registry, "glowmoss", EncounterConfig::default(), &mut rng).unwrap();
            assert_eq!(party.len(), 3);
            assert_eq!(party[0].name, "Glowmoss");
            assert!(party[1..].iter().all(|c| c.name != "Glowmoss"));
            assert_ne!(party[1].name, party[2].name);
        }
    }

    #[test]
    fn test_unknown_hero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            select_party(&registry(), "william", EncounterConfig::default(), &mut rng),
            Err(EncounterError::UnknownHero("william".to_string()))
        );
    }

    #[test]
    fn test_two_fillers_then_a_leader() {
        let table = table();
        for seed in 0..30 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let enemies =
                select_enemies(&table, "grove", EncounterConfig::default(), &mut rng).unwrap();
            assert_eq!(enemies.len(), 3);
            assert!(enemies[..2]
                .iter()
                .all(|e| matches!(rarity_of(e), "common" | "uncommon")));
            assert_ne!(enemies[0].id, enemies[1].id);
            assert!(matches!(rarity_of(&enemies[2]), "rare" | "elite"));
        }
    }

    #[test]
    fn test_leader_falls_back_to_fillers() {
        let table = table();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let enemies =
            select_enemies(&table, "shallows", EncounterConfig::default(), &mut rng).unwrap();
        assert_eq!(enemies.len(), 3);
        assert!(enemies
            .iter()
            .all(|e| e.name == "Tide Crab" || e.name == "Reef Eel"));
    }

    #[test]
    fn test_enemy_stats_come_from_the_zone_tier() {
        let table = table();
        assert_eq!(enemy_stats(&table, "grove", Rarity::Rare).hp, 130);
        assert_eq!(enemy_stats(&table, "shallows", Rarity::Common).hp, 90);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let enemies =
            select_enemies(&table, "grove", EncounterConfig::default(), &mut rng).unwrap();
        for enemy in &enemies {
            let expected = match rarity_of(enemy) {
                "common" => 70,
                "uncommon" => 85,
                "rare" => 130,
                _ => FALLBACK_ENEMY_STATS.hp,
            };
            assert_eq!(enemy.stats.hp, expected, "{}", enemy.name);
        }
    }

    #[test]
    fn test_missing_tier_stats_use_fallback() {
        let table = table();
        assert_eq!(enemy_stats(&table, "grove", Rarity::Elite), FALLBACK_ENEMY_STATS);
        assert_eq!(enemy_stats(&table, "shallows", Rarity::Uncommon), FALLBACK_ENEMY_STATS);
        assert_eq!(enemy_stats(&table, "nowhere", Rarity::Common), FALLBACK_ENEMY_STATS);
        assert_eq!(
            FALLBACK_ENEMY_STATS,
            BaseStats {
                hp: 60,
                power: 10,
                defense: 8,
                magic_resist: 0,
                speed: 10,
            }
        );
    }

    #[test]
    fn test_empty_zone() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            select_enemies(&table(), "volcano", EncounterConfig::default(), &mut rng),
            Err(EncounterError::EmptyZone("volcano".to_string()))
        );
    }

    #[test]
    fn test_same_seed_same_encounter() {
        let registry = registry();
        let build = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            build_encounter(&registry, "trapper", "grove", EncounterConfig::default(), &mut rng)
                .unwrap()
        };
        assert_eq!(build(12), build(12));
        let encounter = build(12);
        assert_eq!(encounter.tier.as_deref(), Some("tier1"));
        assert_eq!(encounter.allies[0].name, "Trapper");
    }
}
