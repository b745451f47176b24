//! Error types for the battle engine.

use thiserror::Error;

use crate::unit::UnitId;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle engine errors.
///
/// Rule outcomes such as a move on cooldown are not errors; they are
/// reported through [`crate::engine::MoveOutcome`] and the battle log.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A unit reference points outside both rosters.
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path of the file being accessed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot was written by an incompatible format version.
    #[error("Snapshot version mismatch: expected {expected}, got {found}")]
    SnapshotVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Invalid battle state (serialization failures and the like).
    #[error("Invalid battle state: {0}")]
    InvalidState(String),
}
