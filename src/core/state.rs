//! Autosplitter status, shared with the host

use serde::{Deserialize, Serialize};

use crate::game::{BinaryVariant, GameState};

/// Current state of the autosplitter
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AutosplitterState {
    /// Whether a game process is currently attached
    pub process_attached: bool,
    /// Process ID if attached
    pub process_id: Option<u32>,
    /// Layout in use
    pub game_version: Option<BinaryVariant>,
    /// False while running on the fallback layout
    pub version_supported: bool,
    /// Last observed raw game state
    pub game_state: Option<GameState>,
    /// Last observed map
    pub current_map: Option<String>,
    /// Whether the game is loading right now
    pub is_loading: bool,
    /// Position of the split cursor
    pub split_index: usize,
    /// Number of selected events (without the trailing empty event)
    pub split_count: usize,
    /// Identifier of the last matched event
    pub last_split: Option<String>,
    /// Passed through from the settings
    pub pause_game_time: bool,
}

impl AutosplitterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every selected event has matched
    pub fn is_finished(&self) -> bool {
        self.split_index >= self.split_count
    }

    /// Forget everything about the attached process
    pub fn clear_process(&mut self) {
        self.process_attached = false;
        self.process_id = None;
        self.game_version = None;
        self.version_supported = false;
        self.game_state = None;
        self.current_map = None;
        self.is_loading = false;
    }

    /// Reset the run progress
    pub fn reset_run(&mut self) {
        self.split_index = 0;
        self.last_split = None;
    }
}
