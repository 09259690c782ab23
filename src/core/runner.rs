//! Main autosplitter runner

use std::sync::Arc;

use parking_lot::Mutex;

use super::events::{EventHandler, SplitCallback, SplitEvent};
use super::sequencer::{ActiveEventSequence, SplitSequencer};
use super::state::AutosplitterState;
use crate::config::SplitterSettings;
use crate::game::{
    AddressTable, BinaryVariant, GameStateSnapshot, GameView, Resolution, VersionResolver,
    MODULE_NAME,
};
use crate::memory::{MemoryProbe, MemoryReader};
use crate::{AutosplitterError, Result};

/// Everything tied to one attached process
struct AttachedGame {
    probe: MemoryProbe,
    resolver: VersionResolver,
    variant: BinaryVariant,
    table: AddressTable,
    snapshot: GameStateSnapshot,
}

/// Drives the engine one host tick at a time.
///
/// The host owns scheduling and process discovery: it calls
/// [`Autosplitter::attach`] with a reader for `stvoy.exe`, then
/// [`Autosplitter::tick`] at a fixed rate from one thread. The status
/// returned by [`Autosplitter::status_handle`] may be read from any thread.
pub struct Autosplitter {
    settings: SplitterSettings,
    sequencer: SplitSequencer,
    game: Option<AttachedGame>,
    /// Current state
    state: Arc<Mutex<AutosplitterState>>,
    /// Event handler for split callbacks
    events: EventHandler,
}

impl Autosplitter {
    pub fn new(settings: SplitterSettings) -> Self {
        let sequence = ActiveEventSequence::new(settings.resolve_events());
        let state = AutosplitterState {
            split_count: sequence.len(),
            pause_game_time: settings.pause_game_time,
            ..Default::default()
        };

        Self {
            settings,
            sequencer: SplitSequencer::new(sequence),
            game: None,
            state: Arc::new(Mutex::new(state)),
            events: EventHandler::new(),
        }
    }

    /// Register a callback for split events
    pub fn on_split(&mut self, callback: SplitCallback) {
        self.events.on_split(callback);
    }

    /// Attach to a freshly found game process.
    ///
    /// Replaces any previous process. The snapshot, split cursor and boss
    /// detector start over, and the version is resolved again.
    pub fn attach(
        &mut self,
        reader: Arc<dyn MemoryReader>,
        base_address: usize,
        module_size: usize,
        process_id: u32,
    ) {
        if self.game.is_some() {
            self.detach();
        }

        let probe = MemoryProbe::new(reader, base_address, module_size, process_id);
        let mut resolver = VersionResolver::default();
        let resolution = resolver.attempt(probe.module_size());
        let variant = resolution.variant();

        log::info!(
            "Attached to {} (PID: {}), base=0x{:X}, size=0x{:X}, version {}",
            MODULE_NAME,
            process_id,
            base_address,
            module_size,
            variant
        );

        self.game = Some(AttachedGame {
            table: self.table_for(variant),
            probe,
            resolver,
            variant,
            snapshot: GameStateSnapshot::new(),
        });
        self.sequencer.reset();

        let mut state = self.state.lock();
        state.clear_process();
        state.reset_run();
        state.process_attached = true;
        state.process_id = Some(process_id);
        state.game_version = Some(variant);
        state.version_supported = resolution.is_supported();
    }

    /// Drop the attached process, if any
    pub fn detach(&mut self) {
        if let Some(game) = self.game.take() {
            log::info!("Detached from {} (PID: {})", MODULE_NAME, game.probe.process_id());
        }
        self.state.lock().clear_process();
    }

    pub fn is_attached(&self) -> bool {
        self.game.is_some()
    }

    /// Run one poll cycle: read memory, update the snapshot, check the event
    /// at the split cursor.
    ///
    /// Returns the matched event, if any. A process that exited is detached
    /// and reported as [`AutosplitterError::NotAttached`].
    pub fn tick(&mut self) -> Result<Option<SplitEvent>> {
        let game = self.game.as_mut().ok_or(AutosplitterError::NotAttached)?;

        if !game.probe.is_valid() {
            log::info!("{} process exited", MODULE_NAME);
            self.detach();
            return Err(AutosplitterError::NotAttached);
        }

        if game.resolver.is_pending() {
            let resolution = game.resolver.attempt(game.probe.module_size());
            if let Resolution::Detected(variant) = resolution {
                if variant != game.variant {
                    game.variant = variant;
                    game.table = Self::table_with_overrides(&self.settings, variant);
                    game.snapshot = GameStateSnapshot::new();
                }
                let mut state = self.state.lock();
                state.game_version = Some(variant);
                state.version_supported = true;
            }
        }

        game.snapshot.update(&game.probe, &game.table);

        let split_index = self.sequencer.cursor();
        let matched = self
            .sequencer
            .advance(&GameView::new(&game.snapshot, &game.probe, &game.table));

        let split = matched.map(|event| {
            log::info!("Split {}: {} ({})", split_index, event, event.id());
            SplitEvent::matched(event, split_index)
        });

        {
            let mut state = self.state.lock();
            state.game_state = Some(game.snapshot.current_state());
            state.current_map = game.snapshot.current_map().map(String::from);
            state.is_loading = game.snapshot.is_loading();
            state.split_index = self.sequencer.cursor();
            if let Some(split) = &split {
                state.last_split = Some(split.event_id.clone());
            }
        }

        if let Some(split) = &split {
            self.events.emit(split);
        }

        Ok(split)
    }

    /// Start a new run: cursor back to the first event, boss detector cleared.
    ///
    /// Called by the host when its timer is reset.
    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.state.lock().reset_run();
        log::info!("Autosplitter reset");
    }

    /// Apply new settings; the run starts over
    pub fn set_settings(&mut self, settings: SplitterSettings) {
        let sequence = ActiveEventSequence::new(settings.resolve_events());
        log::info!("Using {} split events", sequence.len());

        if let Some(game) = self.game.as_mut() {
            game.table = Self::table_with_overrides(&settings, game.variant);
        }

        {
            let mut state = self.state.lock();
            state.split_count = sequence.len();
            state.pause_game_time = settings.pause_game_time;
            state.reset_run();
        }

        self.sequencer.set_sequence(sequence);
        self.settings = settings;
    }

    pub fn settings(&self) -> &SplitterSettings {
        &self.settings
    }

    pub fn sequencer(&self) -> &SplitSequencer {
        &self.sequencer
    }

    /// The snapshot of the attached process
    pub fn snapshot(&self) -> Option<&GameStateSnapshot> {
        self.game.as_ref().map(|g| &g.snapshot)
    }

    /// Address table in use for the attached process
    pub fn address_table(&self) -> Option<&AddressTable> {
        self.game.as_ref().map(|g| &g.table)
    }

    /// Copy of the current status
    pub fn status(&self) -> AutosplitterState {
        self.state.lock().clone()
    }

    /// Shared status for other threads
    pub fn status_handle(&self) -> Arc<Mutex<AutosplitterState>> {
        self.state.clone()
    }

    fn table_for(&self, variant: BinaryVariant) -> AddressTable {
        Self::table_with_overrides(&self.settings, variant)
    }

    fn table_with_overrides(settings: &SplitterSettings, variant: BinaryVariant) -> AddressTable {
        let table = AddressTable::for_variant(variant);
        match settings
            .layout_overrides
            .as_ref()
            .and_then(|o| o.for_variant(variant))
        {
            Some(layout) => {
                log::debug!("Applying layout overrides for version {}", variant);
                table.with_overrides(layout)
            }
            None => table,
        }
    }
}

impl Default for Autosplitter {
    fn default() -> Self {
        Self::new(SplitterSettings::default())
    }
}
