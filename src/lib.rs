//! Reflex Rush - a timed reflex clicking game
//!
//! Core modules:
//! - `sim`: Deterministic game engine (countdown, target scheduling, scoring)
//! - `highscores`: Local best-score table
//! - `settings`: Player preferences
//!
//! The browser presentation adapter lives in `main.rs` and is the only code
//! that touches the DOM; everything under `sim` is pure and testable.

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game tuning constants
pub mod consts {
    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 60;
    /// Countdown tick interval (1 Hz)
    pub const TICK_INTERVAL_MS: u64 = 1_000;

    /// Highest reachable difficulty level
    pub const MAX_LEVEL: u32 = 5;
    /// Points per level step (level = score / step + 1, clamped)
    pub const POINTS_PER_LEVEL: u32 = 10;
    /// Time reward for reaching a new level, seconds
    pub const LEVEL_UP_TIME_BONUS: u32 = 3;

    /// Target diameter at level 1, pixels
    pub const BASE_TARGET_SIZE: u32 = 60;
    /// Diameter lost per level, pixels
    pub const TARGET_SHRINK_PER_LEVEL: u32 = 5;
    /// Smallest diameter the target can shrink to
    pub const MIN_TARGET_SIZE: u32 = 30;

    /// Speed factor gained per level (dwell = BASE_DWELL_MS / speed_factor)
    pub const SPEED_STEP_PER_LEVEL: f32 = 0.3;
    /// Target dwell time at speed factor 1.0, milliseconds
    pub const BASE_DWELL_MS: u64 = 1_500;
    /// Dwell jitter, uniform in [0, DWELL_JITTER_MS) milliseconds
    pub const DWELL_JITTER_MS: u64 = 500;

    /// Combo streak that unlocks the x2 multiplier
    pub const COMBO_TIER_X2: u32 = 5;
    /// Combo streak that unlocks the x3 multiplier
    pub const COMBO_TIER_X3: u32 = 10;

    /// Top band reserved for the HUD, pixels (targets spawn below it)
    pub const HUD_INSET: f32 = 60.0;
    /// Number of cosmetic target variants
    pub const TARGET_VARIANTS: usize = 5;
}
