//! Split cursor over the selected events

use crate::events::catalog;
use crate::events::{CatalogEvent, MatchContext};
use crate::game::GameView;

/// Selected events in gameplay order, terminated by the empty event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEventSequence {
    events: Vec<&'static CatalogEvent>,
}

impl ActiveEventSequence {
    /// Build a sequence; the trailing empty event is appended here
    pub fn new(events: impl IntoIterator<Item = &'static CatalogEvent>) -> Self {
        let mut events: Vec<_> = events.into_iter().filter(|e| !e.is_empty()).collect();
        events.push(catalog::empty());
        Self { events }
    }

    /// Build a sequence from persisted identifiers, in the given order
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Self {
        Self::new(
            ids.iter()
                .map(|id| crate::events::resolve_identifier(id.as_ref())),
        )
    }

    /// Number of selected events, not counting the sentinel
    pub fn len(&self) -> usize {
        self.events.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Event at `index`; the sentinel at `len()`
    pub fn get(&self, index: usize) -> Option<&'static CatalogEvent> {
        self.events.get(index).copied()
    }

    /// Selected events without the sentinel
    pub fn events(&self) -> &[&'static CatalogEvent] {
        &self.events[..self.len()]
    }
}

impl Default for ActiveEventSequence {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

/// Checks one event per tick, the one at the cursor.
///
/// Events ahead of the cursor cannot fire early and passed events cannot fire
/// again. Once the cursor reaches the sentinel nothing matches until
/// [`SplitSequencer::reset`].
#[derive(Debug, Clone)]
pub struct SplitSequencer {
    sequence: ActiveEventSequence,
    cursor: usize,
    context: MatchContext,
}

impl SplitSequencer {
    pub fn new(sequence: ActiveEventSequence) -> Self {
        Self {
            sequence,
            cursor: 0,
            context: MatchContext::new(),
        }
    }

    /// Check the event at the cursor against this tick
    pub fn advance(&mut self, view: &GameView<'_>) -> Option<&'static CatalogEvent> {
        let event = self.current()?;
        if event.is_empty() || !event.kind().occurred(view, &mut self.context) {
            return None;
        }

        self.cursor += 1;
        Some(event)
    }

    /// Start a new run
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.context.reset();
    }

    /// Replace the selection and start over
    pub fn set_sequence(&mut self, sequence: ActiveEventSequence) {
        self.sequence = sequence;
        self.reset();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The event the next tick will check
    pub fn current(&self) -> Option<&'static CatalogEvent> {
        self.sequence.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.sequence.len()
    }

    pub fn sequence(&self) -> &ActiveEventSequence {
        &self.sequence
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }
}
