//! Star Trek: Voyager - Elite Force Autosplitter
//!
//! A memory-based autosplitter engine for `stvoy.exe` (patch 1.1 and 1.2).
//! The host attaches a [`memory::MemoryReader`] to the running game and calls
//! [`Autosplitter::tick`] at a fixed rate; every tick re-reads the game state,
//! derives map and state transitions, and checks the next selected milestone
//! event. Matched events are returned and emitted to registered listeners.
//!
//! Process discovery, the timer itself and the settings UI belong to the host.

pub mod config;
pub mod core;
pub mod events;
pub mod game;
pub mod memory;

use thiserror::Error;

// Re-export commonly used types
pub use crate::config::{LayoutOverrides, SplitterSettings};
pub use crate::core::{ActiveEventSequence, Autosplitter, AutosplitterState, SplitEvent, SplitSequencer};
pub use crate::events::{CatalogEvent, EventKind, MatchContext};
pub use crate::game::{AddressTable, BinaryVariant, GameState, GameStateSnapshot};
pub use crate::memory::{AddressPath, MemoryProbe, MemoryReader, ReadFailure};

/// Errors surfaced by the autosplitter.
///
/// None of these are fatal to the host: reads are retried next tick, an
/// unknown version falls back to a default layout, and unknown identifiers
/// become the empty event.
#[derive(Debug, Error)]
pub enum AutosplitterError {
    #[error("memory read failed: {0}")]
    Read(#[from] ReadFailure),

    #[error("unsupported game version (module size {module_size})")]
    UnsupportedVersion { module_size: usize },

    #[error("unknown event identifier '{0}'")]
    InvalidLegacyIdentifier(String),

    #[error("no game process attached")]
    NotAttached,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AutosplitterError>;
