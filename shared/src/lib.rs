pub mod collision;
pub mod difficulty;
pub mod protocol;

pub use collision::{overlaps_with_inset, Rect};
pub use protocol::{ClientMessage, Player, ServerMessage};

/// Logical board height. The board width is whatever the client window
/// provides; all synchronized coordinates use this fixed vertical space.
pub const BOARD_HEIGHT: f32 = 640.0;

pub const PIPE_WIDTH: f32 = 64.0;
pub const PIPE_HEIGHT: f32 = 512.0;
/// Vertical opening between the upper and lower pipe of a pair.
pub const PIPE_GAP: f32 = BOARD_HEIGHT / 3.2;
/// Pipes always enter the world this far from the left edge so every
/// client sees them at the same x regardless of window width.
pub const PIPE_SPAWN_X: f32 = 800.0;
/// Pipes are dropped once they scroll past this x.
pub const PIPE_CULL_X: f32 = -200.0;

/// The character never moves horizontally; it sits at a fixed x offset.
pub const PLAYER_X: f32 = 60.0;
pub const PLAYER_SIZE: f32 = 90.0;

// Per-fixed-step physics values (60 steps/second).
pub const GRAVITY: f32 = 0.25;
pub const JUMP_VELOCITY: f32 = -6.0;
pub const ROTATION_FACTOR: f32 = 0.05;
pub const ROTATION_MIN: f32 = -0.5;
pub const ROTATION_MAX: f32 = 1.2;

pub const COLLISION_INSET: f32 = 8.0;

/// One quantum of deterministic physics advancement, in milliseconds.
pub const TIME_STEP_MS: f32 = 1000.0 / 60.0;
/// A frame delta larger than this is truncated so a stalled client does
/// not run a catch-up storm of physics steps.
pub const MAX_FRAME_DELTA_MS: f32 = 1000.0;

/// Delay between the start signal and the first obstacle spawn.
pub const COUNTDOWN_MS: u64 = 3000;

/// Per-rendered-frame smoothing applied to remote player state.
pub const REMOTE_SMOOTHING: f32 = 0.15;

pub const MAX_PLAYERS_PER_ROOM: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_pipe_gap_derived_from_board_height() {
        assert_approx_eq!(PIPE_GAP, 200.0, 0.01);
    }

    #[test]
    fn test_fixed_step_is_sixty_hz() {
        assert_approx_eq!(TIME_STEP_MS, 16.667, 0.001);
    }
}
