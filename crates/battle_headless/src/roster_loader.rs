//! Character and constants data loading.
//!
//! A data directory looks like this:
//!
//! ```text
//! assets/data/
//! ├── game_constants.ron      (or .json)
//! ├── encounters.ron          (optional)
//! └── characters/
//!     ├── trapper.ron
//!     └── sparkfin.json
//! ```
//!
//! Characters are keyed by their `id` field, or by file stem when the file
//! leaves `id` empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use battle_core::data::{
    parse_data, CharacterTemplate, DataFormat, EncounterTable, GameConstants,
};
use thiserror::Error;

/// Environment variable that overrides the data directory search.
pub const DATA_DIR_ENV: &str = "BATTLE_DATA_DIR";

/// File stem of the constants file.
pub const CONSTANTS_STEM: &str = "game_constants";

/// File stem of the optional encounter table.
pub const ENCOUNTERS_STEM: &str = "encounters";

/// Subdirectory holding one file per character.
pub const CHARACTERS_DIR: &str = "characters";

/// Errors that can occur during data loading.
#[derive(Debug, Error)]
pub enum RosterLoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {message}")]
    Io {
        /// Path being read.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to parse a data file.
    #[error(transparent)]
    Parse(#[from] battle_core::error::BattleError),

    /// Directory not found.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// No `game_constants.ron` / `game_constants.json` in the directory.
    #[error("No {CONSTANTS_STEM}.ron or {CONSTANTS_STEM}.json in '{0}'")]
    MissingConstants(String),

    /// A requested character id is not in the registry.
    #[error("Unknown character '{0}'")]
    UnknownCharacter(String),
}

/// Constants plus every character loaded from a data directory.
#[derive(Debug, Clone, Default)]
pub struct RosterRegistry {
    constants: GameConstants,
    characters: BTreeMap<String, CharacterTemplate>,
    encounters: EncounterTable,
}

impl RosterRegistry {
    /// Create a registry from already-parsed data.
    pub fn new(constants: GameConstants) -> Self {
        Self {
            constants,
            characters: BTreeMap::new(),
            encounters: EncounterTable::default(),
        }
    }

    /// Add a character, keyed by its id. Returns the id.
    pub fn insert(&mut self, template: CharacterTemplate) -> String {
        let id = template.id.clone();
        self.characters.insert(id.clone(), template);
        id
    }

    /// Load a full data directory.
    pub fn load_from_directory(dir: &Path) -> Result<Self, RosterLoadError> {
        if !dir.is_dir() {
            return Err(RosterLoadError::DirectoryNotFound(
                dir.display().to_string(),
            ));
        }

        let constants_path = find_data_file(dir, CONSTANTS_STEM)
            .ok_or_else(|| RosterLoadError::MissingConstants(dir.display().to_string()))?;
        let mut registry = Self::new(load_file(&constants_path)?);

        if let Some(path) = find_data_file(dir, ENCOUNTERS_STEM) {
            registry.encounters = load_file(&path)?;
        }

        let characters_dir = dir.join(CHARACTERS_DIR);
        if characters_dir.is_dir() {
            registry.load_characters(&characters_dir)?;
        } else {
            tracing::warn!(dir = %characters_dir.display(), "No characters directory");
        }

        tracing::info!(
            dir = %dir.display(),
            characters = registry.characters.len(),
            enemies = registry.encounters.enemies.len(),
            "Loaded battle data"
        );
        Ok(registry)
    }

    /// Load every `.ron` / `.json` file in `dir` as a character.
    ///
    /// Files that fail to parse are an error; files with other extensions
    /// are skipped.
    pub fn load_characters(&mut self, dir: &Path) -> Result<Vec<String>, RosterLoadError> {
        let mut loaded = Vec::new();
        for path in data_files(dir)? {
            let id = self.load_character_file(&path)?;
            loaded.push(id);
        }
        Ok(loaded)
    }

    /// Load one character file. Returns its id.
    pub fn load_character_file(&mut self, path: &Path) -> Result<String, RosterLoadError> {
        let mut template: CharacterTemplate = load_file(path)?;
        if template.id.is_empty() {
            template.id = file_stem(path);
        }
        tracing::debug!(id = %template.id, path = %path.display(), "Loaded character");
        Ok(self.insert(template))
    }

    /// The loaded constants.
    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    /// The loaded encounter table; empty when the directory has none.
    pub fn encounters(&self) -> &EncounterTable {
        &self.encounters
    }

    /// Replace the encounter table.
    pub fn set_encounters(&mut self, encounters: EncounterTable) {
        self.encounters = encounters;
    }

    /// Get a character by id.
    pub fn get(&self, id: &str) -> Option<&CharacterTemplate> {
        self.characters.get(id)
    }

    /// All loaded character ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    /// Number of loaded characters.
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Look up a party by id, in the given order.
    pub fn resolve<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<CharacterTemplate>, RosterLoadError> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                self.get(id)
                    .cloned()
                    .ok_or_else(|| RosterLoadError::UnknownCharacter(id.to_string()))
            })
            .collect()
    }

    /// Look up an enemy party. Names get an `Enemy ` prefix so mirror
    /// matches read clearly in the log.
    pub fn enemy_party<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<CharacterTemplate>, RosterLoadError> {
        Ok(self
            .resolve(ids)?
            .iter()
            .map(|t| t.renamed(format!("Enemy {}", t.name)))
            .collect())
    }
}

fn find_data_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["ron", "json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

/// Sorted list of `.ron` / `.json` files directly inside `dir`.
fn data_files(dir: &Path) -> Result<Vec<PathBuf>, RosterLoadError> {
    let io_err = |e: std::io::Error| RosterLoadError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
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

fn format_of(path: &Path) -> Option<DataFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DataFormat::from_extension)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read and parse one data file, picking the format from its extension.
pub fn load_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RosterLoadError> {
    let origin = path.display().to_string();
    let format = format_of(path).ok_or_else(|| RosterLoadError::Io {
        path: origin.clone(),
        message: "unsupported extension (expected .ron or .json)".to_string(),
    })?;
    let text = fs::read_to_string(path).map_err(|e| RosterLoadError::Io {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    Ok(parse_data(&text, format, &origin)?)
}

/// Resolve the default data directory.
///
/// Looks in these places, in order:
/// 1. Environment variable `BATTLE_DATA_DIR`
/// 2. `./assets/data` (repo root)
/// 3. `../../assets/data` (running from a crate directory)
pub fn default_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let path = PathBuf::from(dir);
        if path.exists() {
            return Some(path);
        }
    }

    ["assets/data", "../../assets/data"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Load from an explicit directory, or the default one when `None`.
pub fn load_roster_from_path(dir: Option<&Path>) -> Result<RosterRegistry, RosterLoadError> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => default_data_dir().ok_or_else(|| {
            RosterLoadError::DirectoryNotFound("battle data directory".to_string())
        })?,
    };
    RosterRegistry::load_from_directory(&dir)
}
