//! Edge-detected input sampling.

use macroquad::prelude::*;

/// One frame's worth of input edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputEvents {
    /// Space/Up key or click: flap (also starts a single-player round).
    pub jump: bool,
    /// Enter: request a round start from the lobby or the leaderboard.
    pub start: bool,
}

/// Samples keys each frame and reports press edges, so holding a key
/// produces exactly one event.
pub struct InputManager {
    prev_jump: bool,
    prev_start: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_jump: false,
            prev_start: false,
        }
    }

    pub fn poll(&mut self) -> InputEvents {
        let jump_down = is_key_down(KeyCode::Space) || is_key_down(KeyCode::Up);
        let start_down = is_key_down(KeyCode::Enter);

        let events = InputEvents {
            jump: (jump_down && !self.prev_jump) || is_mouse_button_pressed(MouseButton::Left),
            start: start_down && !self.prev_start,
        };

        self.prev_jump = jump_down;
        self.prev_start = start_down;
        events
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
