//! Deadline-driven game engine
//!
//! The engine owns a logical millisecond clock supplied by the caller. Two
//! deadlines can be pending at once: the 1 Hz countdown tick and the target
//! relocation. `advance` fires whatever is due in timestamp order, so a
//! driver calling it at any frame rate observes the same transitions.
//!
//! Each deadline lives in a single `Option<u64>` slot; cancelling a pending
//! task is clearing or overwriting the slot, so a stale timer can never fire
//! after `activate`, `start`, or `end` rescheduled it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{
    GameEvent, GamePhase, GameState, PlayArea, Target, level_for_score, multiplier_for_combo,
};
use crate::consts::*;

/// The game engine: sole mutator of [`GameState`]
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    rng: Pcg32,
    play_area: PlayArea,
    /// Next countdown deadline, None while no session is running
    tick_at: Option<u64>,
    /// Pending relocation deadline, None while none is scheduled
    relocate_at: Option<u64>,
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(seed: u64, play_area: PlayArea) -> Self {
        Self {
            state: GameState::default(),
            rng: Pcg32::seed_from_u64(seed),
            play_area,
            tick_at: None,
            relocate_at: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn play_area(&self) -> PlayArea {
        self.play_area
    }

    /// Update the bounds used for future relocations (window resize)
    pub fn set_play_area(&mut self, area: PlayArea) {
        self.play_area = area;
    }

    /// Drain queued notifications in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a session. No-op while one is already running.
    pub fn start(&mut self, now_ms: u64) {
        if self.state.is_running() {
            return;
        }
        self.state = GameState::default();
        self.state.phase = GamePhase::Running;
        self.events.push(GameEvent::SessionStarted);
        self.tick_at = Some(now_ms + TICK_INTERVAL_MS);
        self.relocate_at = None;
        self.relocate_target(now_ms);
    }

    /// Fire every deadline due at `now_ms`, oldest first. The countdown wins
    /// ties, so a session expiring exactly on a relocation boundary ends
    /// before the target moves.
    pub fn advance(&mut self, now_ms: u64) {
        loop {
            let tick_due = self.tick_at.filter(|&t| t <= now_ms);
            let reloc_due = self.relocate_at.filter(|&t| t <= now_ms);
            match (tick_due, reloc_due) {
                (Some(t), Some(r)) if r < t => self.fire_relocation(r),
                (Some(t), _) => self.fire_tick(t),
                (None, Some(r)) => self.fire_relocation(r),
                (None, None) => break,
            }
        }
    }

    /// Advance the countdown by one second. Invoked once per elapsed second
    /// while a session is running; ignored otherwise.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining == 0 {
            self.end();
        } else {
            self.events.push(GameEvent::TimeUpdated {
                remaining: self.state.time_remaining,
            });
        }
    }

    /// Move the target to a fresh random spot and re-arm the dwell timer
    /// from `now_ms`. A still-visible target means the player ran out of
    /// time: the combo breaks before the move. Writing the new deadline
    /// replaces any pending one, so relocations never double-schedule.
    pub fn relocate_target(&mut self, now_ms: u64) {
        if !self.state.is_running() {
            return;
        }
        if self.state.target.visible {
            self.break_combo();
        }
        let size = self.state.target_size;
        let pos = self.random_position(size);
        let variant = self.rng.random_range(0..TARGET_VARIANTS);
        self.state.target = Target {
            pos,
            variant,
            visible: true,
        };
        self.events.push(GameEvent::TargetMoved { pos, size, variant });

        let dwell = (BASE_DWELL_MS as f32 / self.state.speed_factor) as u64;
        let jitter = self.rng.random_range(0..DWELL_JITTER_MS);
        self.relocate_at = Some(now_ms + dwell + jitter);
    }

    /// Player hit the visible target. Ignored when no session is running or
    /// the target is hidden, so a stray activation cannot score twice.
    pub fn activate(&mut self, now_ms: u64) {
        if !self.state.is_running() || !self.state.target.visible {
            return;
        }

        // Points use the multiplier and level in force when the hit landed
        let points = self.state.combo_multiplier * self.state.level;
        self.state.score += points;
        self.state.combo += 1;
        self.state.combo_multiplier = multiplier_for_combo(self.state.combo);
        self.events.push(GameEvent::ScoreUpdated {
            score: self.state.score,
            points,
            combo: self.state.combo,
            multiplier: self.state.combo_multiplier,
        });

        let level = level_for_score(self.state.score);
        if level > self.state.level {
            self.state.level = level;
            self.state.apply_level();
            self.state.time_remaining =
                (self.state.time_remaining + LEVEL_UP_TIME_BONUS).min(SESSION_SECONDS);
            self.events.push(GameEvent::LevelChanged {
                level,
                target_size: self.state.target_size,
                speed_factor: self.state.speed_factor,
            });
            self.events.push(GameEvent::TimeUpdated {
                remaining: self.state.time_remaining,
            });
        }

        self.state.target.visible = false;
        self.relocate_at = None;
        self.relocate_target(now_ms);
    }

    /// Stop the session. Safe to call repeatedly; only the first call after
    /// `start` does anything.
    pub fn end(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.phase = GamePhase::Over;
        self.tick_at = None;
        self.relocate_at = None;
        self.state.target.visible = false;
        self.events.push(GameEvent::GameOver {
            final_score: self.state.score,
        });
    }

    fn fire_tick(&mut self, deadline: u64) {
        // Re-arm from the deadline, not the wall clock, to keep a 1 Hz
        // cadence with no drift; `end` clears the slot if the session dies.
        self.tick_at = Some(deadline + TICK_INTERVAL_MS);
        self.tick();
    }

    fn fire_relocation(&mut self, deadline: u64) {
        self.relocate_at = None;
        self.relocate_target(deadline);
    }

    fn break_combo(&mut self) {
        self.state.combo = 0;
        self.state.combo_multiplier = multiplier_for_combo(0);
        self.events.push(GameEvent::ComboBroken);
    }

    /// Uniform position keeping the target fully inside the play area and
    /// below the HUD band. Degenerate areas clamp to the band origin.
    fn random_position(&mut self, size: u32) -> Vec2 {
        let size = size as f32;
        let max_x = (self.play_area.width - size).max(0.0);
        let max_y = (self.play_area.height - HUD_INSET - size).max(0.0);
        let x = if max_x > 0.0 {
            self.rng.random_range(0.0..max_x)
        } else {
            0.0
        };
        let y = if max_y > 0.0 {
            self.rng.random_range(0.0..max_y)
        } else {
            0.0
        };
        Vec2::new(x.floor(), (HUD_INSET + y).floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::target_size_for_level;
    use proptest::prelude::*;

    const AREA: PlayArea = PlayArea {
        width: 800.0,
        height: 600.0,
    };

    fn engine() -> Engine {
        Engine::new(7, AREA)
    }

    #[test]
    fn first_hit_scores_one_point() {
        let mut e = engine();
        e.start(0);
        e.activate(10);
        let s = e.state();
        assert_eq!(s.score, 1);
        assert_eq!(s.combo, 1);
        assert_eq!(s.combo_multiplier, 1);
        assert_eq!(s.level, 1);
        assert!(e.drain_events().contains(&GameEvent::ScoreUpdated {
            score: 1,
            points: 1,
            combo: 1,
            multiplier: 1,
        }));
    }

    #[test]
    fn five_hit_streak_doubles_the_multiplier() {
        let mut e = engine();
        e.start(0);
        for i in 0..5 {
            e.activate(10 + i * 50);
        }
        assert_eq!(e.state().combo, 5);
        assert_eq!(e.state().combo_multiplier, 2);
        assert_eq!(e.state().score, 5);
    }

    #[test]
    fn ten_hit_streak_triples_the_multiplier() {
        let mut e = engine();
        e.start(0);
        for i in 0..10 {
            e.activate(10 + i * 50);
        }
        assert_eq!(e.state().combo, 10);
        assert_eq!(e.state().combo_multiplier, 3);
    }

    #[test]
    fn reaching_level_two_shrinks_and_speeds_up_the_target() {
        let mut e = engine();
        e.start(0);
        // Burn some clock so the time bonus is observable
        for _ in 0..5 {
            e.tick();
        }
        assert_eq!(e.state().time_remaining, 55);

        let mut t = 0;
        while e.state().level == 1 {
            t += 40;
            e.activate(t);
        }
        let s = e.state();
        assert_eq!(s.level, 2);
        assert_eq!(s.target_size, 55);
        assert!((s.speed_factor - 1.3).abs() < 1e-6);
        assert_eq!(s.time_remaining, 58);
    }

    #[test]
    fn level_bonus_never_exceeds_session_length() {
        let mut e = engine();
        e.start(0);
        let mut t = 0;
        while e.state().level == 1 {
            t += 40;
            e.activate(t);
        }
        assert_eq!(e.state().time_remaining, SESSION_SECONDS);
    }

    #[test]
    fn unanswered_relocation_breaks_the_combo() {
        let mut e = engine();
        e.start(0);
        e.activate(100);
        e.activate(200);
        e.activate(300);
        assert_eq!(e.state().combo, 3);
        let score = e.state().score;
        let _ = e.drain_events();

        let deadline = e.relocate_at.unwrap();
        e.advance(deadline);
        let events = e.drain_events();
        let s = e.state();
        assert_eq!(s.combo, 0);
        assert_eq!(s.combo_multiplier, 1);
        assert_eq!(s.score, score);
        assert!(s.target.visible);
        assert!(events.contains(&GameEvent::ComboBroken));
    }

    #[test]
    fn sixty_ticks_end_the_session() {
        let mut e = engine();
        e.start(0);
        for _ in 0..SESSION_SECONDS {
            e.tick();
        }
        assert!(!e.state().is_running());
        assert_eq!(e.state().phase, GamePhase::Over);
        assert_eq!(e.state().time_remaining, 0);
    }

    #[test]
    fn session_times_out_under_advance() {
        let mut e = engine();
        e.start(0);
        e.advance(61_000);
        let s = e.state();
        assert_eq!(s.phase, GamePhase::Over);
        assert_eq!(s.time_remaining, 0);
        assert!(!s.target.visible);

        let events = e.drain_events();
        let game_overs = events
            .iter()
            .filter(|ev| matches!(ev, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 0 }));
    }

    #[test]
    fn countdown_keeps_a_fixed_cadence() {
        let mut e = engine();
        e.start(0);
        e.advance(2_499);
        assert_eq!(e.state().time_remaining, SESSION_SECONDS - 2);
        assert_eq!(e.tick_at, Some(3_000));
    }

    #[test]
    fn countdown_wins_deadline_ties() {
        let mut e = engine();
        e.start(0);
        let _ = e.drain_events();
        e.state.time_remaining = 1;
        e.tick_at = Some(5_000);
        e.relocate_at = Some(5_000);

        e.advance(5_000);
        assert!(!e.state().is_running());
        assert!(!e.state().target.visible);
        assert!(e.relocate_at.is_none());
        let events = e.drain_events();
        assert!(
            events
                .iter()
                .all(|ev| !matches!(ev, GameEvent::TargetMoved { .. }))
        );
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn activation_cancels_the_pending_relocation() {
        let mut e = engine();
        e.start(0);
        assert!(e.relocate_at.is_some());
        e.activate(100);
        // Exactly one pending relocation, scheduled from the activation
        let rescheduled = e.relocate_at.unwrap();
        assert!(rescheduled >= 100 + BASE_DWELL_MS);
        assert_eq!(e.state().combo, 1);
    }

    #[test]
    fn end_is_idempotent() {
        let mut e = engine();
        e.start(0);
        e.activate(50);
        e.end();
        assert!(e.tick_at.is_none());
        assert!(e.relocate_at.is_none());

        let snapshot = e.state().clone();
        let _ = e.drain_events();
        e.end();
        assert_eq!(e.state(), &snapshot);
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn start_is_ignored_mid_session() {
        let mut e = engine();
        e.start(0);
        for i in 1..=4 {
            e.activate(i * 30);
        }
        let _ = e.drain_events();
        e.start(500);
        assert_eq!(e.state().score, 4);
        assert!(
            e.drain_events()
                .iter()
                .all(|ev| !matches!(ev, GameEvent::SessionStarted))
        );
    }

    #[test]
    fn activation_requires_a_running_session() {
        let mut e = engine();
        e.activate(10);
        assert_eq!(e.state().score, 0);
        assert_eq!(e.state().phase, GamePhase::Idle);

        e.start(0);
        e.end();
        e.activate(20);
        assert_eq!(e.state().score, 0);
    }

    #[test]
    fn hidden_target_cannot_be_activated() {
        let mut e = engine();
        e.start(0);
        e.state.target.visible = false;
        e.activate(50);
        assert_eq!(e.state().score, 0);
        assert_eq!(e.state().combo, 0);
    }

    #[test]
    fn session_can_restart_after_game_over() {
        let mut e = engine();
        e.start(0);
        e.activate(10);
        e.end();
        e.start(1_000);
        let s = e.state();
        assert!(s.is_running());
        assert_eq!(s.score, 0);
        assert_eq!(s.time_remaining, SESSION_SECONDS);
        assert!(s.target.visible);
    }

    #[test]
    fn sessions_with_equal_seeds_replay_identically() {
        let area = PlayArea {
            width: 640.0,
            height: 480.0,
        };
        let mut a = Engine::new(42, area);
        let mut b = Engine::new(42, area);
        for e in [&mut a, &mut b] {
            e.start(0);
            e.advance(1_700);
            e.activate(1_750);
            e.advance(4_000);
        }
        assert_eq!(a.state(), b.state());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    proptest! {
        #[test]
        fn target_always_inside_play_area(
            seed in any::<u64>(),
            w in 200.0f32..2000.0,
            h in 200.0f32..2000.0,
        ) {
            let mut e = Engine::new(seed, PlayArea { width: w, height: h });
            e.start(0);
            let mut t = 0u64;
            for _ in 0..40 {
                t += 700;
                e.advance(t);
                let s = e.state();
                if !s.is_running() {
                    break;
                }
                let size = s.target_size as f32;
                prop_assert!(s.target.pos.x >= 0.0);
                prop_assert!(s.target.pos.x + size <= w);
                prop_assert!(s.target.pos.y >= HUD_INSET);
                prop_assert!(s.target.pos.y + size <= h);
            }
        }

        #[test]
        fn derived_fields_track_their_inputs(
            seed in any::<u64>(),
            ops in proptest::collection::vec(0u8..3, 1..200),
        ) {
            let mut e = Engine::new(seed, AREA);
            e.start(0);
            let mut now = 0u64;
            for op in ops {
                now += 300;
                match op {
                    0 => e.activate(now),
                    1 => e.tick(),
                    _ => e.advance(now),
                }
                let s = e.state();
                prop_assert_eq!(s.level, level_for_score(s.score));
                prop_assert_eq!(s.combo_multiplier, multiplier_for_combo(s.combo));
                prop_assert_eq!(s.target_size, target_size_for_level(s.level));
                prop_assert!(s.time_remaining <= SESSION_SECONDS);
            }
        }
    }
}
