//! Game constants: the type effectiveness chart and display tables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::move_data::Keyword;

/// Elemental type identifier (e.g. `"nature"`, `"spark"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    /// Create a type identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Type effectiveness chart: attack type -> defense type -> multiplier.
///
/// Missing rows or cells are neutral (1.0). Conventional values are
/// 0.0 (immune), 0.5 (resisted), 1.0 (neutral) and 2.0 (super effective).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeChart(BTreeMap<TypeId, BTreeMap<TypeId, f64>>);

impl TypeChart {
    /// Neutral multiplier used for missing entries.
    pub const NEUTRAL: f64 = 1.0;

    /// Create an empty chart (everything neutral).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one cell of the chart.
    pub fn set(&mut self, attack: impl Into<TypeId>, defense: impl Into<TypeId>, multiplier: f64) {
        self.0
            .entry(attack.into())
            .or_default()
            .insert(defense.into(), multiplier);
    }

    /// Builder form of [`TypeChart::set`].
    #[must_use]
    pub fn with(mut self, attack: &str, defense: &str, multiplier: f64) -> Self {
        self.set(attack, defense, multiplier);
        self
    }

    /// Multiplier for a move of `attack` type hitting a `defense` type.
    #[must_use]
    pub fn effectiveness(&self, attack: &TypeId, defense: &TypeId) -> f64 {
        self.0
            .get(attack)
            .and_then(|row| row.get(defense))
            .copied()
            .unwrap_or(Self::NEUTRAL)
    }

    /// Iterate over explicit entries in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&TypeId, &TypeId, f64)> {
        self.0
            .iter()
            .flat_map(|(atk, row)| row.iter().map(move |(def, m)| (atk, def, *m)))
    }

    /// Every type mentioned as attacker or defender, sorted.
    #[must_use]
    pub fn known_types(&self) -> Vec<&TypeId> {
        let mut types: Vec<&TypeId> = self
            .0
            .iter()
            .flat_map(|(atk, row)| std::iter::once(atk).chain(row.keys()))
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

/// Display name and icon for a type or keyword.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IconEntry {
    /// Display name.
    pub name: String,
    /// Icon glyph.
    #[serde(default)]
    pub icon: String,
}

/// Game-wide constants loaded once at startup.
///
/// # Example RON
///
/// ```ron
/// GameConstants(
///     types: { "spark": IconEntry(name: "Spark", icon: "⚡") },
///     keywords: { damage: IconEntry(name: "Damage", icon: "⚔") },
///     type_chart: { "spark": { "water": 2.0 } },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameConstants {
    /// Type display table.
    #[serde(default)]
    pub types: BTreeMap<TypeId, IconEntry>,
    /// Keyword display table.
    #[serde(default)]
    pub keywords: BTreeMap<Keyword, IconEntry>,
    /// Effectiveness chart.
    #[serde(default)]
    pub type_chart: TypeChart,
}

impl GameConstants {
    /// Icon for a type, empty if unknown.
    #[must_use]
    pub fn type_icon(&self, id: &TypeId) -> &str {
        self.types.get(id).map_or("", |t| t.icon.as_str())
    }

    /// Display name for a type, falling back to the raw id.
    #[must_use]
    pub fn type_name<'a>(&'a self, id: &'a TypeId) -> &'a str {
        self.types.get(id).map_or(id.as_str(), |t| t.name.as_str())
    }

    /// Icon for a keyword, empty if unknown.
    #[must_use]
    pub fn keyword_icon(&self, keyword: Keyword) -> &str {
        self.keywords.get(&keyword).map_or("", |k| k.icon.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_data, DataFormat};

    #[test]
    fn test_missing_entries_are_neutral() {
        let chart = TypeChart::new().with("spark", "water", 2.0);
        assert_eq!(chart.effectiveness(&"spark".into(), &"water".into()), 2.0);
        assert_eq!(chart.effectiveness(&"spark".into(), &"stone".into()), 1.0);
        assert_eq!(chart.effectiveness(&"ghost".into(), &"water".into()), 1.0);
    }

    #[test]
    fn test_immune_entry_is_kept() {
        let chart = TypeChart::new().with("spark", "stone", 0.0);
        assert_eq!(chart.effectiveness(&"spark".into(), &"stone".into()), 0.0);
    }

    #[test]
    fn test_known_types_sorted_and_deduped() {
        let chart = TypeChart::new()
            .with("water", "fire", 2.0)
            .with("fire", "water", 0.5)
            .with("fire", "nature", 2.0);
        let names: Vec<&str> = chart.known_types().into_iter().map(TypeId::as_str).collect();
        assert_eq!(names, vec!["fire", "nature", "water"]);
    }

    #[test]
    fn test_constants_from_json() {
        let json = r#"{
            "types": { "water": { "name": "Water", "icon": "~" } },
            "keywords": { "heal": { "name": "Heal", "icon": "+" } },
            "type_chart": { "water": { "fire": 2.0 } }
        }"#;
        let constants: GameConstants =
            parse_data(json, DataFormat::Json, "constants.json").unwrap();
        let water = TypeId::new("water");
        assert_eq!(constants.type_name(&water), "Water");
        assert_eq!(constants.type_icon(&water), "~");
        assert_eq!(constants.keyword_icon(Keyword::Heal), "+");
        assert_eq!(constants.keyword_icon(Keyword::Stun), "");
        assert_eq!(constants.type_chart.effectiveness(&water, &"fire".into()), 2.0);
    }
}
