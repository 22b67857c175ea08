//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Logical clock only (callers supply millisecond timestamps)
//! - Seeded RNG only
//! - No DOM, rendering, or platform dependencies

pub mod engine;
pub mod state;

pub use engine::Engine;
pub use state::{
    GameEvent, GamePhase, GameState, PlayArea, Target, level_for_score, multiplier_for_combo,
    speed_factor_for_level, target_size_for_level,
};
