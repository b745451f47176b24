//! Data validation utilities.
//!
//! The engine trusts its input. These checks catch bad data before it gets
//! there: every file is parsed and checked, and every problem is collected
//! rather than stopping at the first.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use battle_core::data::{
    parse_data, CharacterTemplate, DataFormat, EncounterTable, GameConstants, TypeId,
    FALLBACK_ENEMY_STATS,
};
use thiserror::Error;

/// Errors that stop validation before any file is checked.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The data directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// No constants file in the directory.
    #[error("No game_constants.ron or game_constants.json in '{0}'")]
    MissingConstants(String),

    /// A directory could not be listed.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Directory being listed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// One problem found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// File the problem is in.
    pub file: PathBuf,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Outcome of validating a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Files parsed (successfully or not).
    pub files_checked: usize,
    /// Every problem found.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Check if no problems were found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    fn push_all(&mut self, file: &Path, messages: Vec<String>) {
        self.issues
            .extend(messages.into_iter().map(|message| ValidationIssue {
                file: file.to_path_buf(),
                message,
            }));
    }
}

/// Check the constants table on its own.
///
/// Multipliers must be finite and non-negative. Types used in the chart
/// must appear in the type table when the table is not empty.
#[must_use]
pub fn validate_constants(constants: &GameConstants) -> Vec<String> {
    let mut problems = Vec::new();
    for (attack, defense, multiplier) in constants.type_chart.entries() {
        if !multiplier.is_finite() || multiplier < 0.0 {
            problems.push(format!(
                "type_chart[{attack}][{defense}] = {multiplier} must be finite and non-negative"
            ));
        }
    }
    if !constants.types.is_empty() {
        for ty in constants.type_chart.known_types() {
            if !constants.types.contains_key(ty) {
                problems.push(format!("type_chart mentions unknown type '{ty}'"));
            }
        }
    }
    problems
}

/// Types a character may use: the type table, or the chart's types when
/// the table is empty.
fn known_types(constants: &GameConstants) -> Vec<&TypeId> {
    if constants.types.is_empty() {
        constants.type_chart.known_types()
    } else {
        constants.types.keys().collect()
    }
}

/// Check one character against the constants table.
#[must_use]
pub fn validate_character(template: &CharacterTemplate, constants: &GameConstants) -> Vec<String> {
    let mut problems = Vec::new();
    let known = known_types(constants);
    let is_known = |ty: &TypeId| known.is_empty() || known.contains(&ty);

    if template.name.is_empty() {
        problems.push("name is empty".to_string());
    }
    if template.stats.hp == 0 {
        problems.push("stats.hp must be positive".to_string());
    }
    if template.types.is_empty() {
        problems.push("types is empty".to_string());
    }
    for ty in template.types.iter().filter(|t| !is_known(*t)) {
        problems.push(format!("unknown type '{ty}'"));
    }
    if template.moves.is_empty() {
        problems.push("has no moves".to_string());
    }
    for (i, mv) in template.moves.iter().enumerate() {
        let label = format!("move {} '{}'", i + 1, mv.name);
        if mv.keywords.is_empty() {
            problems.push(format!("{label} has no keywords"));
        }
        if !is_known(&mv.move_type) {
            problems.push(format!("{label} has unknown type '{}'", mv.move_type));
        }
    }
    problems
}

/// Check an encounter table against the constants table.
///
/// Every enemy must pass the character checks, and every zone with
/// enemies needs a tier that has stat lines. Missing rarities within a
/// tier are allowed; they fall back to default stats.
#[must_use]
pub fn validate_encounters(table: &EncounterTable, constants: &GameConstants) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();

    for enemy in &table.enemies {
        if !seen.insert(enemy.id.as_str()) {
            problems.push(format!("duplicate enemy id '{}'", enemy.id));
        }
        let character = enemy.to_character(FALLBACK_ENEMY_STATS);
        for problem in validate_character(&character, constants) {
            problems.push(format!("enemy '{}': {problem}", enemy.id));
        }
    }

    for zone in table.zones() {
        match table.tier(zone) {
            None => problems.push(format!("zone '{zone}' has enemies but no tier")),
            Some(tier) if !table.tier_stats.contains_key(tier) => {
                problems.push(format!("zone '{zone}' uses tier '{tier}', which has no stats"));
            }
            Some(_) => {}
        }
    }

    for (tier, lines) in &table.tier_stats {
        for (rarity, stats) in lines {
            if stats.hp == 0 {
                problems.push(format!("tier_stats[{tier}][{rarity}].hp must be positive"));
            }
        }
    }
    problems
}

fn format_of(path: &Path) -> Option<DataFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DataFormat::from_extension)
}

fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>, ValidateError> {
    let io_err = |source| ValidateError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && format_of(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a file, recording a read or parse failure as an issue.
fn parse_file<T: serde::de::DeserializeOwned>(
    path: &Path,
    report: &mut ValidationReport,
) -> Option<T> {
    report.files_checked += 1;
    let format = format_of(path)?;
    let origin = path.display().to_string();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            report.push_all(path, vec![format!("cannot read: {e}")]);
            return None;
        }
    };
    match parse_data(&text, format, &origin) {
        Ok(value) => Some(value),
        Err(e) => {
            report.push_all(path, vec![e.to_string()]);
            None
        }
    }
}

/// Validate the constants file and every character file in a directory.
///
/// # Errors
///
/// Returns an error if the directory or its constants file is missing.
/// Problems inside files are reported in the [`ValidationReport`].
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport, ValidateError> {
    if !path.is_dir() {
        return Err(ValidateError::DirectoryNotFound(path.display().to_string()));
    }
    let constants_path = ["ron", "json"]
        .iter()
        .map(|ext| path.join(format!("game_constants.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| ValidateError::MissingConstants(path.display().to_string()))?;

    let mut report = ValidationReport::default();
    let constants: GameConstants = match parse_file(&constants_path, &mut report) {
        Some(constants) => constants,
        None => return Ok(report),
    };
    report.push_all(&constants_path, validate_constants(&constants));

    let encounters_path = ["ron", "json"]
        .iter()
        .map(|ext| path.join(format!("encounters.{ext}")))
        .find(|p| p.is_file());
    if let Some(encounters_path) = encounters_path {
        if let Some(table) = parse_file::<EncounterTable>(&encounters_path, &mut report) {
            report.push_all(&encounters_path, validate_encounters(&table, &constants));
        }
    }

    let characters_dir = path.join("characters");
    if !characters_dir.is_dir() {
        tracing::warn!(dir = %characters_dir.display(), "No characters directory");
        return Ok(report);
    }

    let mut seen_ids: BTreeMap<String, PathBuf> = BTreeMap::new();
    for file in list_data_files(&characters_dir)? {
        let Some(template) = parse_file::<CharacterTemplate>(&file, &mut report) else {
            continue;
        };
        tracing::debug!(file = %file.display(), name = %template.name, "Checking character");
        report.push_all(&file, validate_character(&template, &constants));

        let id = if template.id.is_empty() {
            file.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            template.id.clone()
        };
        if let Some(first) = seen_ids.get(&id) {
            report.push_all(
                &file,
                vec![format!("duplicate id '{id}' (also in {})", first.display())],
            );
        } else {
            seen_ids.insert(id, file);
        }
    }

    Ok(report)
}
