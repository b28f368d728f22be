//! Fixed-timestep local simulation.
//!
//! All physics advances in whole 16.667 ms steps pulled from an
//! accumulator, so the simulation result depends only on elapsed time
//! and never on how the display chunks its frames.

use shared::difficulty::{gap_origin_y, scroll_speed, spawn_interval_ms};
use shared::{
    overlaps_with_inset, Rect, BOARD_HEIGHT, COLLISION_INSET, COUNTDOWN_MS, GRAVITY,
    JUMP_VELOCITY, MAX_FRAME_DELTA_MS, PIPE_CULL_X, PIPE_GAP, PIPE_HEIGHT, PIPE_SPAWN_X,
    PIPE_WIDTH, PLAYER_SIZE, PLAYER_X, ROTATION_FACTOR, ROTATION_MAX, ROTATION_MIN,
    TIME_STEP_MS,
};

/// Client state machine. `Spectating` is the multiplayer post-death
/// state: the world keeps scrolling and remote players keep moving, but
/// the local character no longer integrates or collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Start,
    Countdown,
    Playing,
    GameOver,
    Spectating,
    Leaderboard,
}

/// One pipe rectangle. A spawn event always creates two of these (upper
/// and lower) from a single authoritative y value.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub x: f32,
    pub y: f32,
    pub passed: bool,
}

impl Pipe {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PIPE_WIDTH, PIPE_HEIGHT)
    }
}

/// Accumulator that converts arbitrary frame deltas into whole fixed
/// steps. Deltas are capped so a long stall cannot trigger a catch-up
/// storm.
pub struct FixedTimestep {
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self { accumulator: 0.0 }
    }

    /// Feeds one frame's wall-clock delta and returns how many fixed
    /// steps to run.
    pub fn advance(&mut self, delta_ms: f32) -> u32 {
        self.accumulator += delta_ms.min(MAX_FRAME_DELTA_MS);
        let mut steps = 0;
        while self.accumulator >= TIME_STEP_MS {
            self.accumulator -= TIME_STEP_MS;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new()
    }
}

/// The local player's state to report after a playing step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReport {
    pub y: f32,
    pub rotation: f32,
    pub score: f32,
}

/// What one fixed step produced, for the caller to act on.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepOutcome {
    /// The local player died this step.
    pub died: bool,
    /// Multiplayer only: state to send to the server this step.
    pub report: Option<PositionReport>,
}

pub struct LocalSim {
    pub phase: Phase,
    multiplayer: bool,
    pub y: f32,
    velocity_y: f32,
    pub rotation: f32,
    pub score: f32,
    /// Step counter driving the idle bob and wing-flap animation.
    pub frame: u64,
    pub pipes: Vec<Pipe>,
    countdown_ms: f32,
    spawn_timer_ms: f32,
}

impl LocalSim {
    pub fn new(multiplayer: bool) -> Self {
        Self {
            phase: Phase::Menu,
            multiplayer,
            y: BOARD_HEIGHT / 2.0,
            velocity_y: 0.0,
            rotation: 0.0,
            score: 0.0,
            frame: 0,
            pipes: Vec::new(),
            countdown_ms: 0.0,
            spawn_timer_ms: 0.0,
        }
    }

    pub fn is_multiplayer(&self) -> bool {
        self.multiplayer
    }

    fn reset(&mut self) {
        self.y = BOARD_HEIGHT / 2.0;
        self.velocity_y = 0.0;
        self.rotation = 0.0;
        self.score = 0.0;
        self.frame = 0;
        self.pipes.clear();
        self.spawn_timer_ms = 0.0;
    }

    /// Single-player entry: idle bob, waiting for the first tap.
    pub fn begin_start(&mut self) {
        self.reset();
        self.phase = Phase::Start;
    }

    /// Round entry: both modes pass through the 3-step visual countdown.
    pub fn begin_countdown(&mut self) {
        self.reset();
        self.countdown_ms = COUNTDOWN_MS as f32;
        self.phase = Phase::Countdown;
    }

    pub fn enter_leaderboard(&mut self) {
        self.phase = Phase::Leaderboard;
    }

    /// Seconds remaining on the countdown display; 0 means "GO!".
    pub fn countdown_display(&self) -> u64 {
        (self.countdown_ms / 1000.0).ceil().max(0.0) as u64
    }

    /// Jump input. No cooldown; may be issued every step.
    pub fn jump(&mut self) {
        match self.phase {
            Phase::Start => self.begin_countdown(),
            Phase::Playing => self.velocity_y = JUMP_VELOCITY,
            _ => {}
        }
    }

    /// Materializes an obstacle pair from one authoritative gap origin.
    /// Ignored outside active or spectating play, so spawns arriving
    /// during menus or the countdown cannot desync the field.
    pub fn spawn_pipe_pair(&mut self, y: f32) {
        if !matches!(self.phase, Phase::Playing | Phase::Spectating) {
            return;
        }
        self.pipes.push(Pipe {
            x: PIPE_SPAWN_X,
            y,
            passed: false,
        });
        self.pipes.push(Pipe {
            x: PIPE_SPAWN_X,
            y: y + PIPE_HEIGHT + PIPE_GAP,
            passed: false,
        });
    }

    fn player_rect(&self) -> Rect {
        Rect::new(PLAYER_X, self.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    fn handle_death(&mut self) {
        self.phase = if self.multiplayer {
            Phase::Spectating
        } else {
            Phase::GameOver
        };
    }

    /// Advances one fixed step. `rand01` feeds the single-player spawn
    /// draw; multiplayer ignores it (spawns come from the server).
    pub fn fixed_step(&mut self, rand01: f32) -> StepOutcome {
        let mut out = StepOutcome::default();

        if matches!(self.phase, Phase::Menu | Phase::Leaderboard | Phase::GameOver) {
            return out;
        }

        if matches!(self.phase, Phase::Playing | Phase::Spectating) {
            // Obstacle speed follows the local player's own score.
            let speed = scroll_speed(self.score);

            if !self.multiplayer && self.phase == Phase::Playing {
                self.spawn_timer_ms += TIME_STEP_MS;
                if self.spawn_timer_ms > spawn_interval_ms(self.score) as f32 {
                    let y = gap_origin_y(rand01);
                    self.spawn_pipe_pair(y);
                    self.spawn_timer_ms = 0.0;
                }
            }

            let mut collided = false;
            let playing = self.phase == Phase::Playing;
            for pipe in &mut self.pipes {
                pipe.x += speed;
                if playing && !pipe.passed && PLAYER_X > pipe.x + PIPE_WIDTH {
                    self.score += 0.5;
                    pipe.passed = true;
                }
            }
            if playing {
                let me = self.player_rect();
                collided = self
                    .pipes
                    .iter()
                    .any(|p| overlaps_with_inset(&me, &p.rect(), COLLISION_INSET));
            }

            while self.pipes.first().map_or(false, |p| p.x < PIPE_CULL_X) {
                self.pipes.remove(0);
            }

            if collided {
                self.handle_death();
                out.died = true;
                return out;
            }
        }

        match self.phase {
            Phase::Playing => {
                self.frame += 1;
                self.velocity_y += GRAVITY;
                self.y += self.velocity_y;
                self.y = self.y.max(0.0);
                self.rotation =
                    (self.velocity_y * ROTATION_FACTOR).clamp(ROTATION_MIN, ROTATION_MAX);

                if self.y + PLAYER_SIZE > BOARD_HEIGHT {
                    self.handle_death();
                    out.died = true;
                    return out;
                }

                if self.multiplayer {
                    out.report = Some(PositionReport {
                        y: self.y,
                        rotation: self.rotation,
                        score: self.score,
                    });
                }
            }
            Phase::Start | Phase::Countdown => {
                // Idle bob: no physics during the wait or the countdown.
                self.frame += 1;
                self.y = BOARD_HEIGHT / 2.0 + (self.frame as f32 * 0.05).sin() * 10.0;
                self.rotation = 0.0;

                if self.phase == Phase::Countdown {
                    self.countdown_ms -= TIME_STEP_MS;
                    if self.countdown_ms <= 0.0 {
                        self.phase = Phase::Playing;
                        self.spawn_timer_ms = 0.0;
                    }
                }
            }
            Phase::Spectating => {
                self.frame += 1;
            }
            _ => {}
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn playing_sim(multiplayer: bool) -> LocalSim {
        let mut sim = LocalSim::new(multiplayer);
        sim.begin_countdown();
        sim.phase = Phase::Playing;
        sim
    }

    #[test]
    fn test_accumulator_step_count_ignores_chunking() {
        // 500ms total, three different chunkings, same step count.
        let chunkings: [&[f32]; 3] = [
            &[500.0],
            &[100.0, 100.0, 100.0, 100.0, 100.0],
            &[16.0, 484.0],
        ];
        let expected = (500.0 / TIME_STEP_MS) as u32;
        for deltas in chunkings {
            let mut ts = FixedTimestep::new();
            let steps: u32 = deltas.iter().map(|d| ts.advance(*d)).sum();
            assert_eq!(steps, expected);
        }
    }

    #[test]
    fn test_accumulator_caps_stall_deltas() {
        let mut ts = FixedTimestep::new();
        // A 10s stall counts as at most 1000ms of simulation.
        let steps = ts.advance(10_000.0);
        assert_eq!(steps, (1000.0 / TIME_STEP_MS) as u32);
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut ts = FixedTimestep::new();
        assert_eq!(ts.advance(10.0), 0);
        assert_eq!(ts.advance(10.0), 1);
    }

    #[test]
    fn test_pair_scores_one_point_total_once() {
        let mut sim = playing_sim(false);
        sim.spawn_pipe_pair(-200.0);
        // Move the pair just past the player's x.
        for pipe in &mut sim.pipes {
            pipe.x = PLAYER_X - PIPE_WIDTH - 1.0;
        }
        sim.fixed_step(0.0);
        assert_approx_eq!(sim.score, 1.0, 1e-6);
        // Already-passed pipes never score again.
        sim.fixed_step(0.0);
        assert_approx_eq!(sim.score, 1.0, 1e-6);
    }

    #[test]
    fn test_collision_with_pipe_ends_round() {
        let mut sim = playing_sim(false);
        sim.y = 300.0;
        sim.pipes.push(Pipe {
            x: PLAYER_X,
            y: 300.0,
            passed: false,
        });
        let out = sim.fixed_step(0.0);
        assert!(out.died);
        assert_eq!(sim.phase, Phase::GameOver);
    }

    #[test]
    fn test_multiplayer_death_enters_spectating() {
        let mut sim = playing_sim(true);
        sim.y = 300.0;
        sim.pipes.push(Pipe {
            x: PLAYER_X,
            y: 300.0,
            passed: false,
        });
        let out = sim.fixed_step(0.0);
        assert!(out.died);
        assert_eq!(sim.phase, Phase::Spectating);

        // Spectating keeps obstacles moving but never reports or dies.
        let x_before = sim.pipes[0].x;
        let out = sim.fixed_step(0.0);
        assert!(!out.died);
        assert!(out.report.is_none());
        assert!(sim.pipes[0].x < x_before);
    }

    #[test]
    fn test_bottom_boundary_kills() {
        let mut sim = playing_sim(false);
        sim.y = BOARD_HEIGHT - PLAYER_SIZE;
        sim.velocity_y = 5.0;
        let out = sim.fixed_step(0.0);
        assert!(out.died);
    }

    #[test]
    fn test_top_boundary_clamps_without_death() {
        let mut sim = playing_sim(false);
        sim.y = 0.0;
        sim.velocity_y = -20.0;
        let out = sim.fixed_step(0.0);
        assert!(!out.died);
        assert_eq!(sim.y, 0.0);
    }

    #[test]
    fn test_jump_sets_upward_velocity_and_rotation_clamps() {
        let mut sim = playing_sim(false);
        sim.jump();
        sim.fixed_step(0.0);
        assert!(sim.velocity_y < 0.0);
        assert!(sim.rotation >= ROTATION_MIN);

        // Long fall pins rotation at the maximum.
        for _ in 0..120 {
            if sim.phase != Phase::Playing {
                break;
            }
            sim.fixed_step(0.0);
        }
        assert!(sim.rotation <= ROTATION_MAX);
    }

    #[test]
    fn test_pipes_culled_left_of_board() {
        let mut sim = playing_sim(false);
        sim.pipes.push(Pipe {
            x: PIPE_CULL_X + 1.0,
            y: 0.0,
            passed: true,
        });
        for _ in 0..2 {
            sim.fixed_step(0.0);
        }
        assert!(sim.pipes.is_empty());
    }

    #[test]
    fn test_single_player_spawn_cadence() {
        let mut sim = playing_sim(false);
        // Base interval is 1600ms; well under it nothing spawns.
        let steps_under = (1500.0 / TIME_STEP_MS) as usize;
        for _ in 0..steps_under {
            sim.fixed_step(0.5);
        }
        assert!(sim.pipes.is_empty());
        // Within a few more steps the interval elapses and a pair appears.
        for _ in 0..10 {
            sim.fixed_step(0.5);
        }
        assert_eq!(sim.pipes.len(), 2);
        // The pair shares x and derives the lower pipe from the gap.
        assert_eq!(sim.pipes[0].x, sim.pipes[1].x);
        assert_approx_eq!(
            sim.pipes[1].y - sim.pipes[0].y,
            PIPE_HEIGHT + PIPE_GAP,
            1e-4
        );
    }

    #[test]
    fn test_multiplayer_never_spawns_locally() {
        let mut sim = playing_sim(true);
        for _ in 0..200 {
            sim.fixed_step(0.5);
            if sim.phase != Phase::Playing {
                break;
            }
        }
        assert!(sim.pipes.is_empty());
    }

    #[test]
    fn test_spawn_ignored_outside_active_play() {
        let mut sim = LocalSim::new(true);
        sim.spawn_pipe_pair(-200.0);
        assert!(sim.pipes.is_empty());
        sim.begin_countdown();
        sim.spawn_pipe_pair(-200.0);
        assert!(sim.pipes.is_empty());
    }

    #[test]
    fn test_countdown_runs_idle_bob_then_plays() {
        let mut sim = LocalSim::new(false);
        sim.begin_countdown();
        assert_eq!(sim.countdown_display(), 3);
        // Well short of 3000ms the countdown is still running.
        let steps_under = (2900.0 / TIME_STEP_MS) as usize;
        for _ in 0..steps_under {
            sim.fixed_step(0.0);
            assert_ne!(sim.phase, Phase::Playing);
        }
        // A handful of further steps crosses the threshold.
        for _ in 0..10 {
            sim.fixed_step(0.0);
        }
        assert_eq!(sim.phase, Phase::Playing);
        assert_eq!(sim.score, 0.0);
    }

    #[test]
    fn test_playing_reports_every_step_in_multiplayer() {
        let mut sim = playing_sim(true);
        let out = sim.fixed_step(0.0);
        let report = out.report.expect("no report");
        assert_eq!(report.y, sim.y);
        assert_eq!(report.rotation, sim.rotation);

        // Single-player never reports.
        let mut sim = playing_sim(false);
        assert!(sim.fixed_step(0.0).report.is_none());
    }
}
