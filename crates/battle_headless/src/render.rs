//! Plain-text rendering for the terminal.
//!
//! Every function returns a `String`; printing is left to the binary.

use std::fmt::Write as _;

use battle_core::prelude::*;

use crate::runner::BattleOutcome;

/// Width of an HP bar, not counting the brackets.
pub const HP_BAR_WIDTH: usize = 20;

const RULE: &str = "========================================";

/// `[████░░░░...]` with `floor(width * current / max)` filled cells.
pub fn hp_bar(current: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        (HP_BAR_WIDTH as u64 * u64::from(current.min(max)) / u64::from(max)) as usize
    };
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(HP_BAR_WIDTH - filled)
    )
}

/// HP status of both rosters, one line per unit.
pub fn hp_status(state: &BattleState) -> String {
    let mut out = String::from("HP Status:\n");
    for (label, team) in [("Allies", Team::Ally), ("Enemies", Team::Enemy)] {
        let _ = writeln!(out, "{label}:");
        for unit in state.roster(team) {
            let _ = writeln!(
                out,
                "  {}: {} {}/{}",
                unit.name,
                hp_bar(unit.current_hp, unit.max_hp),
                unit.current_hp,
                unit.max_hp
            );
        }
    }
    out
}

/// Turn order as `Name (Speed: n)` entries.
pub fn turn_order(state: &BattleState, order: &[UnitId]) -> String {
    let names: Vec<String> = order
        .iter()
        .filter_map(|id| state.unit(*id))
        .map(|u| format!("{} (Speed: {})", u.name, u.current_stats.speed))
        .collect();
    format!("Turn order: {}", names.join(", "))
}

/// The battle log, one message per line.
pub fn battle_log(log: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in log {
        out.push_str(&entry.message);
        out.push('\n');
    }
    out
}

/// Closing banner.
pub fn outcome_banner(outcome: &BattleOutcome) -> String {
    match outcome.winner {
        Some(team) => format!(
            "========== BATTLE ENDED: {} WINS! ==========",
            team.as_str().to_uppercase()
        ),
        None => format!(
            "========== BATTLE ENDED: DRAW AFTER {} ROUNDS ==========",
            outcome.rounds_played
        ),
    }
}

fn type_label(constants: &GameConstants, id: &TypeId) -> String {
    format!("{} {}", constants.type_icon(id), constants.type_name(id))
}

/// Full character card.
pub fn character_card(template: &CharacterTemplate, constants: &GameConstants) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    if template.title.is_empty() {
        let _ = writeln!(out, "{}", template.name);
    } else {
        let _ = writeln!(out, "{} — {}", template.name, template.title);
    }
    let _ = writeln!(out, "{RULE}");

    let role = match &template.role_secondary {
        Some(secondary) => format!("{} / {secondary}", template.role_primary),
        None => template.role_primary.clone(),
    };
    let _ = writeln!(out, "Role: {role}");
    let types: Vec<String> = template
        .types
        .iter()
        .map(|t| type_label(constants, t))
        .collect();
    let _ = writeln!(out, "Types: {}", types.join(", "));
    let _ = writeln!(out, "Rarity: {} | Rank: {}", template.rarity, template.rank);

    let s = &template.stats;
    let _ = writeln!(out, "\nStats:");
    let _ = writeln!(
        out,
        "  HP: {} | Power: {} | Defense: {}",
        s.hp, s.power, s.defense
    );
    let _ = writeln!(out, "  Magic Resist: {} | Speed: {}", s.magic_resist, s.speed);

    let passive = &template.passive;
    let _ = writeln!(out, "\nPassive: {} {}", passive.icon, passive.name);
    if !passive.description.is_empty() {
        let _ = writeln!(out, "  {}", passive.description);
    }

    let _ = writeln!(out, "\nMoves:");
    for (i, mv) in template.moves.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} {} [CD: {}]",
            i + 1,
            mv.name,
            constants.type_icon(&mv.move_type),
            mv.cooldown
        );
        let icons: Vec<&str> = mv
            .keywords
            .iter()
            .map(|k| constants.keyword_icon(*k))
            .collect();
        let _ = writeln!(out, "     {} {}", icons.join(" "), mv.description);
    }

    let _ = writeln!(out, "\nSynergies: {}", template.synergy_tags.join(", "));
    if let Some(perk) = &template.exploration_perk {
        let _ = writeln!(out, "\nExploration Perk: {}", perk.name);
        let _ = writeln!(out, "  {}", perk.description);
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Type effectiveness grid over every type in the constants table.
///
/// Super-effective cells are marked `✓`, resisted cells `✗`.
pub fn type_chart(constants: &GameConstants) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "========== TYPE EFFECTIVENESS CHART ==========\n");
    let _ = writeln!(
        out,
        "Legend: 2.0 = Super Effective | 1.0 = Neutral | 0.5 = Not Very Effective | 0.0 = Immune\n"
    );
    let _ = writeln!(out, "Attacker → Defender");
    let _ = writeln!(out, "{}", "─".repeat(60));

    let types: Vec<&TypeId> = constants.types.keys().collect();
    for attack in &types {
        let mut row = format!("{} {:<10}", constants.type_icon(attack), attack.as_str());
        for defense in &types {
            let eff = constants.type_chart.effectiveness(attack, defense);
            let mut cell = format!("{eff:.1}");
            if (eff - 2.0).abs() < f64::EPSILON {
                cell.insert(0, '✓');
            } else if (eff - 0.5).abs() < f64::EPSILON {
                cell.insert(0, '✗');
            }
            let _ = write!(row, "{cell:<6}");
        }
        let _ = writeln!(out, "{}", row.trim_end());
    }

    let _ = writeln!(out, "{}", "=".repeat(60));
    out
}
