//! The fixed, ordered list of every known milestone event

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Campaign maps in play order
pub const CAMPAIGN_MAPS: &[&str] = &[
    "borg1", "borg2", "holodeck", "voy1", "voy2", "voy3", "voy4", "voy5", "stasis1", "stasis2",
    "stasis3", "voy6", "voy7", "voy8", "scav1", "scav2", "scav3", "scav3b", "scav4", "scav5",
    "scavboss", "voy9", "borg3", "borg4", "borg5", "borg6", "voy13", "voy14", "voy15", "dn1",
    "dn2", "dn3", "dn4", "dn5", "train", "dn6", "dn7", "dn8", "voy16", "voy17", "forge1",
    "forge2", "forge3", "forge4", "forge5", "forgeboss", "voy20",
];

/// Map of the Vorsoth fight
pub const BOSS_MAP: &str = "forgeboss";

/// Holodeck maps, left through the menu instead of a level transition
pub const HOLODECK_MAPS: &[&str] = &["holodeck"];

/// Kind of milestone, with its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The single player mission got started
    StartedGame,
    /// A map finished loading and the player is in game
    LoadedMap(&'static str),
    /// The map changed away from this one
    FinishedMap(&'static str),
    /// Returned to the menu while on this holodeck map
    FinishedHoloMap(&'static str),
    /// Vorsoth's health dropped from 1 to 0
    VorsothDead,
    /// Terminal sentinel, never matches
    Empty,
}

impl EventKind {
    /// Stable identifier, used in persisted settings
    pub fn id(&self) -> String {
        match self {
            EventKind::StartedGame => "started_game".to_string(),
            EventKind::LoadedMap(map) => format!("loaded_map:{}", map),
            EventKind::FinishedMap(map) => format!("finished_map:{}", map),
            EventKind::FinishedHoloMap(map) => format!("finished_holo_map:{}", map),
            EventKind::VorsothDead => "vorsoth_dead".to_string(),
            EventKind::Empty => "empty".to_string(),
        }
    }

    pub fn attributes(&self) -> Vec<&'static str> {
        match *self {
            EventKind::LoadedMap(map)
            | EventKind::FinishedMap(map)
            | EventKind::FinishedHoloMap(map) => vec![map],
            EventKind::StartedGame | EventKind::VorsothDead | EventKind::Empty => Vec::new(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventKind::StartedGame => "The single player mission got started.",
            EventKind::LoadedMap(_) => "A certain map was loaded.",
            EventKind::FinishedMap(_) => "A certain map was finished.",
            EventKind::FinishedHoloMap(_) => "A holodeck map was finished.",
            EventKind::VorsothDead => "Vorsoth was killed.",
            EventKind::Empty => "No event.",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::StartedGame => write!(f, "Started a new game"),
            EventKind::LoadedMap(map) => write!(f, "Loaded '{}'", map),
            EventKind::FinishedMap(map) => write!(f, "Finished '{}'", map),
            EventKind::FinishedHoloMap(map) => write!(f, "Finished holodeck '{}'", map),
            EventKind::VorsothDead => write!(f, "Vorsoth dead"),
            EventKind::Empty => write!(f, "-"),
        }
    }
}

/// One catalog entry. Owned by the catalog for the lifetime of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEvent {
    id: String,
    kind: EventKind,
    rank: usize,
}

impl CatalogEvent {
    fn new(kind: EventKind, rank: usize) -> Self {
        Self {
            id: kind.id(),
            kind,
            rank,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Position in the catalog; the empty sentinel sorts after everything
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn attributes(&self) -> Vec<&'static str> {
        self.kind.attributes()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == EventKind::Empty
    }
}

impl fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

fn build_catalog() -> Vec<CatalogEvent> {
    let mut kinds = vec![EventKind::StartedGame];
    for &map in CAMPAIGN_MAPS {
        kinds.push(EventKind::LoadedMap(map));
        if map == BOSS_MAP {
            kinds.push(EventKind::VorsothDead);
        }
        kinds.push(EventKind::FinishedMap(map));
        if HOLODECK_MAPS.contains(&map) {
            kinds.push(EventKind::FinishedHoloMap(map));
        }
    }

    kinds
        .into_iter()
        .enumerate()
        .map(|(rank, kind)| CatalogEvent::new(kind, rank))
        .collect()
}

static CATALOG: Lazy<Vec<CatalogEvent>> = Lazy::new(build_catalog);

static EMPTY: Lazy<CatalogEvent> = Lazy::new(|| CatalogEvent::new(EventKind::Empty, CATALOG.len()));

static BY_ID: Lazy<HashMap<&'static str, &'static CatalogEvent>> = Lazy::new(|| {
    CATALOG
        .iter()
        .map(|event| (event.id(), event))
        .chain(std::iter::once((EMPTY.id(), &*EMPTY)))
        .collect()
});

/// All selectable events, in gameplay order
pub fn catalog() -> &'static [CatalogEvent] {
    &CATALOG
}

/// The terminal sentinel
pub fn empty() -> &'static CatalogEvent {
    &EMPTY
}

/// Look up an event by its stable identifier (including `"empty"`)
pub fn by_id(id: &str) -> Option<&'static CatalogEvent> {
    BY_ID.get(id).copied()
}

/// Look up the catalog entry of a kind
pub fn by_kind(kind: EventKind) -> Option<&'static CatalogEvent> {
    by_id(&kind.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_starts_with_new_game() {
        let first = &catalog()[0];
        assert_eq!(first.kind(), EventKind::StartedGame);
        assert_eq!(first.rank(), 0);
        assert_eq!(first.id(), "started_game");
    }

    #[test]
    fn test_catalog_size() {
        // start + load/finish per map + Vorsoth + holodeck menu exit
        assert_eq!(catalog().len(), 1 + 2 * CAMPAIGN_MAPS.len() + 1 + HOLODECK_MAPS.len());
    }

    #[test]
    fn test_ranks_match_positions() {
        for (i, event) in catalog().iter().enumerate() {
            assert_eq!(event.rank(), i);
        }
        assert_eq!(empty().rank(), catalog().len());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = catalog().iter().map(|e| e.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_vorsoth_between_boss_load_and_finish() {
        let loaded = by_kind(EventKind::LoadedMap(BOSS_MAP)).unwrap();
        let dead = by_kind(EventKind::VorsothDead).unwrap();
        let finished = by_kind(EventKind::FinishedMap(BOSS_MAP)).unwrap();

        assert_eq!(dead.rank(), loaded.rank() + 1);
        assert_eq!(finished.rank(), dead.rank() + 1);
    }

    #[test]
    fn test_holodeck_menu_exit_follows_finish() {
        let finished = by_kind(EventKind::FinishedMap("holodeck")).unwrap();
        let holo = by_id("finished_holo_map:holodeck").unwrap();

        assert_eq!(holo.kind(), EventKind::FinishedHoloMap("holodeck"));
        assert_eq!(holo.rank(), finished.rank() + 1);
    }

    #[test]
    fn test_last_event_is_final_map() {
        let last = catalog().last().unwrap();
        assert_eq!(last.kind(), EventKind::FinishedMap("voy20"));
    }

    #[test]
    fn test_lookup() {
        let event = by_id("loaded_map:borg1").unwrap();
        assert_eq!(event.kind(), EventKind::LoadedMap("borg1"));
        assert_eq!(event.attributes(), vec!["borg1"]);
        assert_eq!(event.description(), "A certain map was loaded.");
        assert_eq!(event.to_string(), "Loaded 'borg1'");

        assert!(by_id("empty").unwrap().is_empty());
        assert!(by_id("loaded_map:nowhere").is_none());
    }
}
