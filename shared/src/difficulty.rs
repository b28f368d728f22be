//! Score-driven difficulty scaling.
//!
//! The server applies these formulas to a room's best live score to pace
//! obstacle spawning; each client applies the same formulas to its own
//! score to pace obstacle scrolling (and, in single-player, spawning).
//! Both sides must agree on the math or obstacle fields diverge.

use crate::PIPE_HEIGHT;

/// Score threshold at which the difficulty level increments by one.
pub const MILESTONE: f32 = 10.0;

pub const BASE_SPAWN_TIME_MS: u64 = 1600;
pub const SPAWN_TIME_STEP_MS: u64 = 100;
pub const MIN_SPAWN_TIME_MS: u64 = 900;

// Leftward scroll applied per fixed step, in board units.
pub const BASE_SCROLL_SPEED: f32 = -3.0;
pub const SCROLL_SPEED_STEP: f32 = -0.5;
pub const MAX_SCROLL_SPEED: f32 = -8.0;

/// Difficulty level for a given score.
pub fn level(score: f32) -> u64 {
    (score / MILESTONE).floor().max(0.0) as u64
}

/// Milliseconds until the next obstacle spawn, as a pure function of the
/// driving score: `max(900, 1600 - 100 * floor(score / 10))`.
pub fn spawn_interval_ms(score: f32) -> u64 {
    BASE_SPAWN_TIME_MS
        .saturating_sub(level(score) * SPAWN_TIME_STEP_MS)
        .max(MIN_SPAWN_TIME_MS)
}

/// Signed per-step obstacle speed for a given score, clamped so the game
/// never scrolls faster than `MAX_SCROLL_SPEED`.
pub fn scroll_speed(score: f32) -> f32 {
    let speed = BASE_SCROLL_SPEED + level(score) as f32 * SCROLL_SPEED_STEP;
    speed.max(MAX_SCROLL_SPEED)
}

/// Vertical origin of the upper pipe for one uniform draw in [0, 1).
///
/// The upper pipe hangs partly above the board; the gap and lower pipe
/// are derived from this single authoritative value.
pub fn gap_origin_y(rand01: f32) -> f32 {
    -PIPE_HEIGHT / 4.0 - rand01 * (PIPE_HEIGHT / 2.5)
}
