//! Data contracts for characters, moves, encounters and game constants.
//!
//! This module contains pure data structures that describe combatants
//! and rules tables. All structs are designed to be deserialized from
//! RON (preferred) or JSON files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses from strings. File loading is handled by `battle_headless`.

mod character_data;
mod constants;
mod encounter_data;
mod move_data;

pub use character_data::{BaseStats, CharacterTemplate, ExplorationPerk, PassiveData};
pub use constants::{GameConstants, IconEntry, TypeChart, TypeId};
pub use encounter_data::{EncounterTable, EnemyTemplate, Rarity, FALLBACK_ENEMY_STATS};
pub use move_data::{Keyword, MoveTemplate, TargetMode};

use serde::de::DeserializeOwned;

use crate::error::{BattleError, Result};

/// Data file encodings understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Rusty Object Notation.
    Ron,
    /// JSON, with the same field names as the RON files.
    Json,
}

impl DataFormat {
    /// Pick a format from a file extension (`ron` or `json`).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ron" => Some(Self::Ron),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a data record from text.
///
/// `origin` is only used to label errors (usually the file path).
///
/// # Errors
///
/// Returns [`BattleError::DataParseError`] if the text does not match the
/// record's shape.
pub fn parse_data<T: DeserializeOwned>(text: &str, format: DataFormat, origin: &str) -> Result<T> {
    let parsed = match format {
        DataFormat::Ron => ron::from_str(text).map_err(|e| e.to_string()),
        DataFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| BattleError::DataParseError {
        path: origin.to_string(),
        message,
    })
}
