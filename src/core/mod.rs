//! Core autosplitter abstractions
//!
//! - `Autosplitter` - attaches to the game and runs one tick at a time
//! - `SplitSequencer` - cursor over the selected events
//! - `SplitEvent` - emitted when the event at the cursor matched
//! - `AutosplitterState` - status snapshot for the host

mod events;
mod runner;
mod sequencer;
mod state;

pub use events::{EventHandler, SplitCallback, SplitEvent};
pub use runner::Autosplitter;
pub use sequencer::{ActiveEventSequence, SplitSequencer};
pub use state::AutosplitterState;
