//! Test fixtures and helpers.
//!
//! The sample roster mirrors the three demo characters shipped in
//! `assets/data`. Each character lists its cooldown moves first so the
//! first-ready scripted policy rotates through its kit.

use battle_core::prelude::*;

/// Constants used by tests that exercise the display tables.
pub const SAMPLE_CONSTANTS_RON: &str = r#"GameConstants(
    types: {
        "nature": IconEntry(name: "Nature", icon: "🌿"),
        "water": IconEntry(name: "Water", icon: "💧"),
        "spark": IconEntry(name: "Spark", icon: "⚡"),
        "light": IconEntry(name: "Light", icon: "✨"),
    },
    keywords: {
        damage: IconEntry(name: "Damage", icon: "⚔"),
        heal: IconEntry(name: "Heal", icon: "💚"),
        shield: IconEntry(name: "Shield", icon: "🛡"),
        poison: IconEntry(name: "Poison", icon: "☠"),
        stun: IconEntry(name: "Stun", icon: "💫"),
        cleanse: IconEntry(name: "Cleanse", icon: "🫧"),
    },
    type_chart: {
        "nature": { "water": 2.0, "nature": 0.5 },
        "water": { "nature": 0.5, "water": 0.5 },
        "spark": { "water": 2.0, "nature": 0.5, "spark": 0.5 },
        "light": { "light": 0.5 },
    },
)"#;

/// Parse [`SAMPLE_CONSTANTS_RON`].
///
/// # Panics
///
/// Panics if the embedded RON is malformed.
#[must_use]
pub fn sample_constants() -> GameConstants {
    ron::from_str(SAMPLE_CONSTANTS_RON).expect("sample constants parse")
}

/// The type chart from [`sample_constants`].
#[must_use]
pub fn sample_chart() -> TypeChart {
    sample_constants().type_chart
}

/// Stats with no magic resistance.
#[must_use]
pub const fn stats(hp: u32, power: u32, defense: u32, speed: u32) -> BaseStats {
    BaseStats {
        hp,
        power,
        defense,
        magic_resist: 0,
        speed,
    }
}

/// Build a move.
#[must_use]
pub fn move_template(
    name: &str,
    power: u32,
    move_type: &str,
    cooldown: u32,
    keywords: &[Keyword],
    target: TargetMode,
) -> MoveTemplate {
    MoveTemplate {
        name: name.to_string(),
        power,
        move_type: TypeId::new(move_type),
        cooldown,
        keywords: keywords.to_vec(),
        target,
        description: String::new(),
    }
}

/// Build a character with no presentation fields.
#[must_use]
pub fn character(
    name: &str,
    types: &[&str],
    stats: BaseStats,
    moves: Vec<MoveTemplate>,
) -> CharacterTemplate {
    CharacterTemplate {
        id: name.to_lowercase().replace(' ', "_"),
        name: name.to_string(),
        types: types.iter().map(|t| TypeId::new(*t)).collect(),
        stats,
        moves,
        passive: PassiveData::default(),
        title: String::new(),
        role_primary: String::new(),
        role_secondary: None,
        rarity: String::new(),
        rank: 0,
        synergy_tags: Vec::new(),
        exploration_perk: None,
    }
}

/// A one-move punching bag.
#[must_use]
pub fn dummy(name: &str, hp: u32, speed: u32) -> CharacterTemplate {
    character(
        name,
        &["stone"],
        stats(hp, 20, 20, speed),
        vec![move_template(
            "Tackle",
            20,
            "stone",
            0,
            &[Keyword::Damage],
            TargetMode::SingleEnemy,
        )],
    )
}

/// Nature striker with a stun and an area poison.
#[must_use]
pub fn trapper() -> CharacterTemplate {
    let mut template = character(
        "Trapper",
        &["nature"],
        stats(110, 50, 35, 55),
        vec![
            move_template(
                "Snare Trap",
                30,
                "nature",
                2,
                &[Keyword::Damage, Keyword::Stun],
                TargetMode::SingleEnemy,
            ),
            move_template(
                "Thorn Volley",
                25,
                "nature",
                3,
                &[Keyword::Damage, Keyword::Poison],
                TargetMode::AllEnemies,
            ),
            move_template(
                "Vine Lash",
                45,
                "nature",
                0,
                &[Keyword::Damage],
                TargetMode::SingleEnemy,
            ),
        ],
    );
    template.passive = PassiveData {
        name: "Camouflage".to_string(),
        rules: Some(PassiveRules {
            trigger: PassiveTrigger::EndOfRound,
            effect: PassiveEffect::Shield {
                amount: 10,
                duration: 1,
            },
        }),
        ..PassiveData::default()
    };
    template
}

/// Fast water/spark caster with a team shield.
#[must_use]
pub fn sparkfin() -> CharacterTemplate {
    let mut template = character(
        "Sparkfin",
        &["water", "spark"],
        stats(90, 45, 25, 70),
        vec![
            move_template(
                "Tidal Guard",
                30,
                "water",
                2,
                &[Keyword::Shield],
                TargetMode::AllAllies,
            ),
            move_template(
                "Chain Shock",
                35,
                "spark",
                3,
                &[Keyword::Damage],
                TargetMode::AllEnemies,
            ),
            move_template(
                "Static Splash",
                40,
                "spark",
                0,
                &[Keyword::Damage],
                TargetMode::SingleEnemy,
            ),
        ],
    );
    template.passive.name = "Slippery".to_string();
    template
}

/// Slow nature/light healer.
#[must_use]
pub fn glowmoss() -> CharacterTemplate {
    let mut template = character(
        "Glowmoss",
        &["nature", "light"],
        stats(120, 30, 40, 30),
        vec![
            move_template(
                "Mend",
                35,
                "light",
                1,
                &[Keyword::Heal, Keyword::Cleanse],
                TargetMode::SingleAlly,
            ),
            move_template(
                "Radiant Bloom",
                25,
                "light",
                3,
                &[Keyword::Heal],
                TargetMode::AllAllies,
            ),
            move_template(
                "Spore Puff",
                20,
                "nature",
                0,
                &[Keyword::Damage, Keyword::Poison],
                TargetMode::SingleEnemy,
            ),
        ],
    );
    template.passive = PassiveData {
        name: "Photosynthesis".to_string(),
        rules: Some(PassiveRules {
            trigger: PassiveTrigger::StartOfRound,
            effect: PassiveEffect::Heal { amount: 6 },
        }),
        ..PassiveData::default()
    };
    template
}

/// Trapper, Sparkfin and Glowmoss.
#[must_use]
pub fn sample_party() -> Vec<CharacterTemplate> {
    vec![trapper(), sparkfin(), glowmoss()]
}

/// The same party renamed for the enemy side ("Enemy Trapper", ...).
#[must_use]
pub fn mirror_party(party: &[CharacterTemplate]) -> Vec<CharacterTemplate> {
    party
        .iter()
        .map(|t| t.renamed(format!("Enemy {}", t.name)))
        .collect()
}

/// A seeded engine with the sample party against its mirror.
#[must_use]
pub fn sample_engine(seed: u64, tie_break: TieBreak) -> BattleEngine {
    let config = EngineConfig::default()
        .with_seed(seed)
        .with_tie_break(tie_break);
    let mut engine = BattleEngine::with_config(sample_chart(), config);
    let party = sample_party();
    engine.init_battle(&party, &mirror_party(&party));
    engine
}
