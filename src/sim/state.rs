//! Game state and scoring rules
//!
//! Everything needed to snapshot a session lives here. The step functions
//! tying level, multiplier, target size and speed factor to their inputs are
//! the single source of truth; the engine never caches a derived value it
//! could drift from.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// No session started yet
    #[default]
    Idle,
    /// Countdown active, target cycling
    Running,
    /// Timer expired; state is frozen for display
    Over,
}

/// The clickable moving target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Top-left corner in play-area pixels
    pub pos: Vec2,
    /// Cosmetic variant index in [0, TARGET_VARIANTS)
    pub variant: usize,
    /// Only a visible target can be activated
    pub visible: bool,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            variant: 0,
            visible: false,
        }
    }
}

/// Play area dimensions in CSS pixels, supplied by the presentation layer
/// and refreshed on resize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

/// Notifications pushed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    /// A fresh session began; all state is back at defaults
    SessionStarted,
    TimeUpdated {
        remaining: u32,
    },
    /// The target became visible somewhere new
    TargetMoved {
        pos: Vec2,
        size: u32,
        variant: usize,
    },
    /// The dwell timer expired with the target still visible
    ComboBroken,
    ScoreUpdated {
        score: u32,
        points: u32,
        combo: u32,
        multiplier: u32,
    },
    LevelChanged {
        level: u32,
        target_size: u32,
        speed_factor: f32,
    },
    GameOver {
        final_score: u32,
    },
}

/// Complete session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    /// Seconds left, in [0, SESSION_SECONDS]
    pub time_remaining: u32,
    /// Difficulty tier in [1, MAX_LEVEL], derived from score
    pub level: u32,
    /// Consecutive hits without a miss
    pub combo: u32,
    /// {1, 2, 3}, derived from combo
    pub combo_multiplier: u32,
    /// Target diameter in pixels, derived from level
    pub target_size: u32,
    /// Dwell-time divisor, derived from level
    pub speed_factor: f32,
    pub target: Target,
    pub phase: GamePhase,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            time_remaining: SESSION_SECONDS,
            level: 1,
            combo: 0,
            combo_multiplier: 1,
            target_size: BASE_TARGET_SIZE,
            speed_factor: 1.0,
            target: Target::default(),
            phase: GamePhase::Idle,
        }
    }
}

impl GameState {
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Re-derive the level-dependent difficulty values
    pub(crate) fn apply_level(&mut self) {
        self.target_size = target_size_for_level(self.level);
        self.speed_factor = speed_factor_for_level(self.level);
    }
}

/// Level as a function of cumulative score, clamped to MAX_LEVEL
pub fn level_for_score(score: u32) -> u32 {
    (score / POINTS_PER_LEVEL + 1).min(MAX_LEVEL)
}

/// Multiplier step function of the combo streak
pub fn multiplier_for_combo(combo: u32) -> u32 {
    if combo >= COMBO_TIER_X3 {
        3
    } else if combo >= COMBO_TIER_X2 {
        2
    } else {
        1
    }
}

/// Target diameter step function of the level
pub fn target_size_for_level(level: u32) -> u32 {
    BASE_TARGET_SIZE
        .saturating_sub(level.saturating_sub(1).saturating_mul(TARGET_SHRINK_PER_LEVEL))
        .max(MIN_TARGET_SIZE)
}

/// Dwell divisor step function of the level
pub fn speed_factor_for_level(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * SPEED_STEP_PER_LEVEL
}
