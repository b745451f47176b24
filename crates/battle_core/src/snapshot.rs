//! Save and resume in-flight battles.
//!
//! A snapshot holds the complete battle state plus the engine's seed,
//! configuration and RNG position, so a restored battle continues exactly
//! as the uninterrupted battle would have.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::error::{BattleError, Result};
use crate::state::BattleState;

/// Snapshot file format version for compatibility.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume a battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Seed the engine RNG was created from.
    pub seed: u64,
    /// Engine configuration at the time of the snapshot.
    pub config: EngineConfig,
    /// RNG position at the time of the snapshot.
    pub rng: ChaCha8Rng,
    /// The battle itself.
    pub state: BattleState,
}

impl BattleSnapshot {
    /// Fail unless this snapshot was written by the current format version.
    ///
    /// # Errors
    /// Returns [`BattleError::SnapshotVersion`] on mismatch.
    pub fn check_version(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(BattleError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }

    /// Encode with bincode.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::InvalidState(format!("Failed to serialize snapshot: {e}")))
    }

    /// Decode from bincode and check the version.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a snapshot or the version
    /// does not match.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(bytes).map_err(|e| {
            BattleError::InvalidState(format!("Failed to deserialize snapshot: {e}"))
        })?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Save the snapshot to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| BattleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), round = self.state.round, "Snapshot saved");
        Ok(())
    }

    /// Load a snapshot from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// snapshot has another format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| BattleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Pretty JSON export, for inspection.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BattleError::InvalidState(format!("Failed to export snapshot: {e}")))
    }
}
