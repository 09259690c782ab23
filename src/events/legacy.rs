//! Translation of identifiers from older settings files
//!
//! Older versions stored `new_game_started`, `loaded_map_<map>`,
//! `finished_map_<map>`, `finished_holomap_<map>`, `vorsoth_dead` and
//! `empty`. Map names may carry a `.bsp` suffix.

use super::catalog::{self, CatalogEvent, EventKind};
use crate::game::normalize_map_name;
use crate::{AutosplitterError, Result};

/// Translate an old identifier into its catalog entry
pub fn translate(id: &str) -> Result<&'static CatalogEvent> {
    let invalid = || AutosplitterError::InvalidLegacyIdentifier(id.to_string());

    let new_id = match id {
        "new_game_started" => EventKind::StartedGame.id(),
        "vorsoth_dead" => EventKind::VorsothDead.id(),
        "empty" => EventKind::Empty.id(),
        _ => {
            let (prefix, map) = [
                ("finished_holomap_", "finished_holo_map"),
                ("finished_map_", "finished_map"),
                ("loaded_map_", "loaded_map"),
            ]
            .iter()
            .find_map(|(old, new)| id.strip_prefix(old).map(|map| (*new, map)))
            .ok_or_else(invalid)?;

            format!("{}:{}", prefix, normalize_map_name(map))
        }
    };

    catalog::by_id(&new_id).ok_or_else(invalid)
}

/// Resolve any persisted identifier, current or legacy.
///
/// Never fails: identifiers nobody knows become the empty event so that
/// loading settings cannot abort.
pub fn resolve_identifier(id: &str) -> &'static CatalogEvent {
    if let Some(event) = catalog::by_id(id) {
        return event;
    }

    match translate(id) {
        Ok(event) => {
            log::debug!("Translated legacy event id '{}' to '{}'", id, event.id());
            event
        }
        Err(err) => {
            log::warn!("{}; substituting the empty event", err);
            catalog::empty()
        }
    }
}
