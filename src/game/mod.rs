//! Elite Force game model
//!
//! - `version` - module-size based version detection and address tables
//! - `state` - the per-tick [`GameStateSnapshot`]

mod state;
pub mod version;

pub use state::{normalize_map_name, GameState, GameStateSnapshot, MAX_MAP_LENGTH};
pub use version::{AddressTable, BinaryVariant, Resolution, VersionResolver};

use crate::memory::{MemoryProbe, ReadFailure};

/// Main module of the game process
pub const MODULE_NAME: &str = "stvoy.exe";

/// What event matchers get to look at on one tick.
///
/// Bundles the snapshot with the probe so values that are not cached in the
/// snapshot (boss health) can be read on demand.
pub struct GameView<'a> {
    snapshot: &'a GameStateSnapshot,
    probe: &'a MemoryProbe,
    table: &'a AddressTable,
}

impl<'a> GameView<'a> {
    pub fn new(
        snapshot: &'a GameStateSnapshot,
        probe: &'a MemoryProbe,
        table: &'a AddressTable,
    ) -> Self {
        Self {
            snapshot,
            probe,
            table,
        }
    }

    pub fn snapshot(&self) -> &GameStateSnapshot {
        self.snapshot
    }

    /// Read Vorsoth's health right now
    pub fn boss_health(&self) -> Result<i32, ReadFailure> {
        self.probe.read_int(&self.table.boss_health)
    }
}
