//! Per-tick game state derived from raw memory

use serde::{Deserialize, Serialize};

use super::AddressTable;
use crate::memory::MemoryProbe;

/// Bytes read for the current map name
pub const MAX_MAP_LENGTH: usize = 32;

/// Raw game state codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameState {
    /// 0 - the game is closing
    Closing,
    /// 1 - main menu
    #[default]
    MainMenu,
    /// 2 - load state of unknown purpose
    LoadingUnknown,
    /// 3 - only while loading the first level of a new game
    LoadingFirstLevel,
    /// 4 - start of every other load
    LoadingOther,
    /// 5 - main loading state, the bars are blinking
    LoadingBars,
    /// 6 - directly after loading
    PostLoad,
    /// 7 - in game
    InGame,
    /// 8 - videos when starting the game
    IntroVideo,
    /// Any other code
    Unknown(i32),
}

impl GameState {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => GameState::Closing,
            1 => GameState::MainMenu,
            2 => GameState::LoadingUnknown,
            3 => GameState::LoadingFirstLevel,
            4 => GameState::LoadingOther,
            5 => GameState::LoadingBars,
            6 => GameState::PostLoad,
            7 => GameState::InGame,
            8 => GameState::IntroVideo,
            other => GameState::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match *self {
            GameState::Closing => 0,
            GameState::MainMenu => 1,
            GameState::LoadingUnknown => 2,
            GameState::LoadingFirstLevel => 3,
            GameState::LoadingOther => 4,
            GameState::LoadingBars => 5,
            GameState::PostLoad => 6,
            GameState::InGame => 7,
            GameState::IntroVideo => 8,
            GameState::Unknown(code) => code,
        }
    }

    /// Any of the loading codes (2 through 6)
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            GameState::LoadingUnknown
                | GameState::LoadingFirstLevel
                | GameState::LoadingOther
                | GameState::LoadingBars
                | GameState::PostLoad
        )
    }
}

/// Strip the `.bsp` extension some builds keep in the map buffer.
///
/// Map names are otherwise used verbatim; the campaign names are already
/// lower case.
pub fn normalize_map_name(raw: &str) -> &str {
    raw.strip_suffix(".bsp").unwrap_or(raw)
}

/// Game state as of the current tick, plus what it was one tick earlier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub(crate) previous_state: GameState,
    pub(crate) current_state: GameState,
    pub(crate) previous_map: Option<String>,
    pub(crate) current_map: Option<String>,
    pub(crate) map_changed: bool,
    pub(crate) in_game: bool,
    pub(crate) in_menu: bool,
}

impl GameStateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick.
    ///
    /// The map is only re-read when the state code changed; a map string is
    /// never allowed to change while the state code is static, since the
    /// buffer is noisy then. Failed reads keep the previous value.
    pub fn update(&mut self, probe: &MemoryProbe, table: &AddressTable) {
        self.previous_state = self.current_state;
        match probe.read_int(&table.game_state) {
            Ok(code) => self.current_state = GameState::from_code(code),
            Err(err) => log::trace!("game state read failed: {}", err),
        }

        if self.previous_state != self.current_state {
            log::debug!(
                "Game state {:?} -> {:?}",
                self.previous_state,
                self.current_state
            );
            self.map_changed = self.update_map(probe, table);
        } else {
            self.map_changed = false;
        }

        self.in_game = self.current_state == GameState::InGame
            && !Self::skipping_cinematic(probe, table);

        match probe.read_flag(&table.in_menu) {
            Ok(in_menu) => self.in_menu = in_menu,
            Err(err) => log::trace!("in-menu read failed: {}", err),
        }
    }

    fn update_map(&mut self, probe: &MemoryProbe, table: &AddressTable) -> bool {
        let raw = match probe.read_fixed_string(&table.current_map, MAX_MAP_LENGTH) {
            Ok(raw) => raw,
            Err(err) => {
                log::trace!("map read failed: {}", err);
                return false;
            }
        };

        let map = normalize_map_name(&raw);
        if map.is_empty() || self.current_map.as_deref() == Some(map) {
            return false;
        }

        log::debug!("Map {:?} -> {}", self.current_map, map);
        self.previous_map = self.current_map.replace(map.to_string());
        true
    }

    fn skipping_cinematic(probe: &MemoryProbe, table: &AddressTable) -> bool {
        table
            .skipping_cinematic
            .as_ref()
            .and_then(|path| probe.read_flag(path).ok())
            .unwrap_or(false)
    }

    pub fn previous_state(&self) -> GameState {
        self.previous_state
    }

    pub fn current_state(&self) -> GameState {
        self.current_state
    }

    pub fn previous_map(&self) -> Option<&str> {
        self.previous_map.as_deref()
    }

    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    /// True only on the tick the map changed
    pub fn map_changed(&self) -> bool {
        self.map_changed
    }

    /// In game and not skipping a cinematic
    pub fn in_game(&self) -> bool {
        self.in_game
    }

    pub fn in_menu(&self) -> bool {
        self.in_menu
    }

    /// Whether a host that removes load times should pause game time now
    pub fn is_loading(&self) -> bool {
        self.current_state.is_loading()
    }
}
