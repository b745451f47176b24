//! # Battle Core
//!
//! Turn-based battle engine for the Williams World battle mini-game.
//!
//! This crate contains **only** battle rules:
//! - No rendering
//! - No audio
//! - No unseeded randomness (tie-breaks use a seeded [`rand_chacha::ChaCha8Rng`])
//! - No file IO outside of the opt-in [`snapshot`] helpers
//!
//! The engine is a state machine over a single [`state::BattleState`]. An
//! orchestrator (scripted policy or player input) drives it:
//!
//! ```text
//! init_battle -> { process_start_of_round -> execute_move* -> process_end_of_round
//!                  -> check_battle_end } until a winner is set
//! ```
//!
//! ## Crate Structure
//!
//! - [`data`] - Character, move and constants data contracts
//! - [`unit`] - Per-combatant mutable battle state
//! - [`effects`] - Damage, healing, status, shield and cleanse primitives
//! - [`damage`] - Damage formula and type effectiveness
//! - [`turn_order`] - Speed ordering and tie-break strategies
//! - [`passive`] - Passive rule schema and interpreter
//! - [`engine`] - The round lifecycle and move execution
//! - [`snapshot`] - Save/restore of in-flight battles

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod damage;
pub mod data;
pub mod effects;
pub mod engine;
pub mod error;
pub mod log;
pub mod passive;
pub mod snapshot;
pub mod state;
pub mod turn_order;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::damage::{DamageResult, Effectiveness};
    pub use crate::data::{
        BaseStats, CharacterTemplate, GameConstants, Keyword, MoveTemplate, PassiveData,
        TargetMode, TypeChart, TypeId,
    };
    pub use crate::engine::{BattleEngine, MoveOutcome};
    pub use crate::error::{BattleError, Result};
    pub use crate::log::{BattleLog, LogEntry};
    pub use crate::passive::{PassiveEffect, PassiveRules, PassiveTrigger};
    pub use crate::snapshot::BattleSnapshot;
    pub use crate::state::{BattleState, Terrain, TerrainSlots};
    pub use crate::turn_order::TieBreak;
    pub use crate::unit::{BattleUnit, Shield, Stat, StatusEffect, StatusKind, Team, UnitId};
}
