//! Event predicates

use super::catalog::{EventKind, BOSS_MAP};
use crate::game::{GameState, GameView};

/// Boss health before the first observation on the boss map
const UNKNOWN_HEALTH: i32 = -1;

/// Per-run matcher state.
///
/// Only the Vorsoth detector remembers anything across ticks. The state is
/// owned by the run and reset with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    prev_boss_health: i32,
}

impl MatchContext {
    pub fn new() -> Self {
        Self {
            prev_boss_health: UNKNOWN_HEALTH,
        }
    }

    pub fn reset(&mut self) {
        self.prev_boss_health = UNKNOWN_HEALTH;
    }

    /// Last boss health seen on the boss map, -1 when unknown
    pub fn prev_boss_health(&self) -> i32 {
        self.prev_boss_health
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EventKind {
    /// Whether this event happened on the current tick
    pub fn occurred(&self, view: &GameView<'_>, ctx: &mut MatchContext) -> bool {
        let info = view.snapshot();
        match *self {
            EventKind::StartedGame => info.current_state() == GameState::LoadingFirstLevel,
            EventKind::LoadedMap(map) => {
                info.previous_state() != GameState::InGame
                    && info.in_game()
                    && info.current_map() == Some(map)
            }
            EventKind::FinishedMap(map) => {
                info.map_changed()
                    && info.current_map() != Some(map)
                    && info.previous_map() == Some(map)
            }
            EventKind::FinishedHoloMap(map) => info.current_map() == Some(map) && info.in_menu(),
            EventKind::VorsothDead => vorsoth_dead(view, ctx),
            EventKind::Empty => false,
        }
    }
}

/// Fires once on the tick health reads 0 right after a tick where it read 1.
///
/// Inert off the boss map: no read and no state change. A failed read is
/// treated as "nothing seen".
fn vorsoth_dead(view: &GameView<'_>, ctx: &mut MatchContext) -> bool {
    if view.snapshot().current_map() != Some(BOSS_MAP) {
        return false;
    }

    let health = match view.boss_health() {
        Ok(health) => health,
        Err(err) => {
            log::trace!("boss health read failed: {}", err);
            return false;
        }
    };

    if ctx.prev_boss_health == 1 && health == 0 {
        ctx.reset();
        return true;
    }

    ctx.prev_boss_health = health;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{AddressTable, BinaryVariant, GameStateSnapshot};
    use crate::memory::{MemoryProbe, MockMemoryReader};
    use std::sync::Arc;

    const BASE: usize = 0x400000;
    const HEALTH_STRUCT: usize = 0x1800_0000;

    struct Fixture {
        reader: Arc<MockMemoryReader>,
        probe: MemoryProbe,
        table: AddressTable,
    }

    impl Fixture {
        fn new() -> Self {
            let reader = Arc::new(MockMemoryReader::new());
            let probe = MemoryProbe::new(reader.clone(), BASE, 0, 1);
            let table = AddressTable::for_variant(BinaryVariant::V12);
            // boss health: [base + 0x641C28] + 0x7A04
            reader.write_u32(BASE + 0x641C28, HEALTH_STRUCT as u32);
            Self { reader, probe, table }
        }

        fn set_health(&self, health: i32) {
            self.reader.write_i32(HEALTH_STRUCT + 0x7A04, health);
        }

        fn check(&self, kind: EventKind, snapshot: &GameStateSnapshot, ctx: &mut MatchContext) -> bool {
            kind.occurred(&GameView::new(snapshot, &self.probe, &self.table), ctx)
        }
    }

    fn snapshot(
        previous_state: GameState,
        current_state: GameState,
        previous_map: Option<&str>,
        current_map: Option<&str>,
        map_changed: bool,
    ) -> GameStateSnapshot {
        GameStateSnapshot {
            previous_state,
            current_state,
            previous_map: previous_map.map(String::from),
            current_map: current_map.map(String::from),
            map_changed,
            in_game: current_state == GameState::InGame,
            in_menu: false,
        }
    }

    #[test]
    fn test_started_game() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();

        let loading = snapshot(GameState::MainMenu, GameState::LoadingFirstLevel, None, None, false);
        assert!(f.check(EventKind::StartedGame, &loading, &mut ctx));

        let other = snapshot(GameState::MainMenu, GameState::LoadingOther, None, None, false);
        assert!(!f.check(EventKind::StartedGame, &other, &mut ctx));
    }

    #[test]
    fn test_loaded_map() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let kind = EventKind::LoadedMap("borg1");

        let entered = snapshot(GameState::PostLoad, GameState::InGame, None, Some("borg1"), true);
        assert!(f.check(kind, &entered, &mut ctx));

        // Already in game on the previous tick
        let staying = snapshot(GameState::InGame, GameState::InGame, None, Some("borg1"), false);
        assert!(!f.check(kind, &staying, &mut ctx));

        let other_map = snapshot(GameState::PostLoad, GameState::InGame, None, Some("borg2"), true);
        assert!(!f.check(kind, &other_map, &mut ctx));
    }

    #[test]
    fn test_loaded_map_requires_in_game_flag() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();

        let mut skipping = snapshot(GameState::PostLoad, GameState::InGame, None, Some("voy1"), true);
        skipping.in_game = false;
        assert!(!f.check(EventKind::LoadedMap("voy1"), &skipping, &mut ctx));
    }

    #[test]
    fn test_finished_map() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let kind = EventKind::FinishedMap("borg1");

        let changed = snapshot(GameState::InGame, GameState::LoadingOther, Some("borg1"), Some("borg2"), true);
        assert!(f.check(kind, &changed, &mut ctx));

        let stale = snapshot(GameState::LoadingOther, GameState::InGame, Some("borg1"), Some("borg2"), false);
        assert!(!f.check(kind, &stale, &mut ctx));

        let wrong_previous = snapshot(GameState::InGame, GameState::LoadingOther, Some("voy1"), Some("borg2"), true);
        assert!(!f.check(kind, &wrong_previous, &mut ctx));
    }

    #[test]
    fn test_finished_holo_map() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let kind = EventKind::FinishedHoloMap("holodeck");

        let mut playing = snapshot(GameState::InGame, GameState::InGame, None, Some("holodeck"), false);
        assert!(!f.check(kind, &playing, &mut ctx));

        playing.in_menu = true;
        assert!(f.check(kind, &playing, &mut ctx));

        let mut elsewhere = snapshot(GameState::InGame, GameState::InGame, None, Some("voy1"), false);
        elsewhere.in_menu = true;
        assert!(!f.check(kind, &elsewhere, &mut ctx));
    }

    #[test]
    fn test_empty_never_matches() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();

        let any = snapshot(GameState::MainMenu, GameState::LoadingFirstLevel, Some("a"), Some("b"), true);
        assert!(!f.check(EventKind::Empty, &any, &mut ctx));
    }

    #[test]
    fn test_vorsoth_health_edge() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let boss = snapshot(GameState::InGame, GameState::InGame, Some("forge5"), Some("forgeboss"), false);

        let mut fired = Vec::new();
        for health in [2, 1, 1, 0, 0] {
            f.set_health(health);
            fired.push(f.check(EventKind::VorsothDead, &boss, &mut ctx));
        }

        assert_eq!(fired, vec![false, false, false, true, false]);
        assert_eq!(ctx.prev_boss_health(), 0);
    }

    #[test]
    fn test_vorsoth_needs_one_before_zero() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let boss = snapshot(GameState::InGame, GameState::InGame, None, Some("forgeboss"), false);

        for health in [5, 0] {
            f.set_health(health);
            assert!(!f.check(EventKind::VorsothDead, &boss, &mut ctx));
        }
    }

    #[test]
    fn test_vorsoth_inert_off_boss_map() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();

        let boss = snapshot(GameState::InGame, GameState::InGame, None, Some("forgeboss"), false);
        f.set_health(1);
        assert!(!f.check(EventKind::VorsothDead, &boss, &mut ctx));
        assert_eq!(ctx.prev_boss_health(), 1);

        let away = snapshot(GameState::InGame, GameState::InGame, None, Some("forge5"), false);
        f.set_health(0);
        assert!(!f.check(EventKind::VorsothDead, &away, &mut ctx));
        assert_eq!(ctx.prev_boss_health(), 1);
    }

    #[test]
    fn test_vorsoth_failed_read_keeps_state() {
        let f = Fixture::new();
        let mut ctx = MatchContext::new();
        let boss = snapshot(GameState::InGame, GameState::InGame, None, Some("forgeboss"), false);

        f.set_health(1);
        assert!(!f.check(EventKind::VorsothDead, &boss, &mut ctx));

        f.reader.clear(HEALTH_STRUCT + 0x7A04);
        assert!(!f.check(EventKind::VorsothDead, &boss, &mut ctx));
        assert_eq!(ctx.prev_boss_health(), 1);

        f.set_health(0);
        assert!(f.check(EventKind::VorsothDead, &boss, &mut ctx));
        assert_eq!(ctx.prev_boss_health(), -1);
    }
}
