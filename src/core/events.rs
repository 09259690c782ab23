//! Events emitted by the autosplitter

use std::time::Instant;

use crate::events::CatalogEvent;

/// Emitted when the event at the split cursor matched
#[derive(Debug, Clone)]
pub struct SplitEvent {
    /// Stable identifier of the matched event
    pub event_id: String,
    /// Display name, e.g. "Finished 'borg1'"
    pub event_name: String,
    /// Human-readable description
    pub description: String,
    /// Catalog rank of the event
    pub rank: usize,
    /// Position of the event in the active sequence
    pub split_index: usize,
    /// When the event occurred
    pub timestamp: Instant,
}

impl SplitEvent {
    pub fn matched(event: &CatalogEvent, split_index: usize) -> Self {
        Self {
            event_id: event.id().to_string(),
            event_name: event.to_string(),
            description: event.description().to_string(),
            rank: event.rank(),
            split_index,
            timestamp: Instant::now(),
        }
    }
}

/// Callback type for split events
pub type SplitCallback = Box<dyn Fn(&SplitEvent) + Send + Sync>;

/// Event handler that can have multiple listeners
pub struct EventHandler {
    callbacks: Vec<SplitCallback>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback for split events
    pub fn on_split(&mut self, callback: SplitCallback) {
        self.callbacks.push(callback);
    }

    /// Emit a split event to all listeners
    pub fn emit(&self, event: &SplitEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.callbacks.is_empty()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
