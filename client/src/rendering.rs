//! Immediate-mode drawing for the world, HUD and the menu-ish screens.

use crate::game::{LocalSim, Phase, Pipe};
use crate::remote::RemoteRoster;
use macroquad::prelude::*;
use shared::{Player, PIPE_HEIGHT, PIPE_WIDTH, PLAYER_SIZE, PLAYER_X};
use std::collections::HashMap;

const SKY: Color = Color::new(0.08, 0.12, 0.20, 1.0);
const PIPE_FILL: Color = Color::new(0.18, 0.80, 0.80, 1.0);
const PIPE_EDGE: Color = Color::new(0.10, 0.32, 0.46, 1.0);
const BIRD: Color = Color::new(0.95, 0.72, 0.20, 1.0);
const GHOST: Color = Color::new(0.95, 0.72, 0.20, 0.5);

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn render(
        &self,
        sim: &LocalSim,
        remotes: &RemoteRoster,
        best_score: f32,
        banner: Option<&str>,
    ) {
        clear_background(SKY);

        if sim.phase == Phase::Menu {
            self.draw_center_text("Waiting for room...", 32.0, WHITE);
            self.draw_banner(banner);
            return;
        }

        for remote in remotes.visible() {
            self.draw_bird(
                remote.displayed_y,
                remote.displayed_rotation,
                sim.frame,
                GHOST,
            );
            draw_text(
                &remote.name,
                PLAYER_X + PLAYER_SIZE / 2.0 - 20.0,
                remote.displayed_y - 8.0,
                18.0,
                Color::new(1.0, 1.0, 1.0, 0.8),
            );
        }

        for pipe in &sim.pipes {
            self.draw_pipe(pipe);
        }

        if sim.phase != Phase::Spectating {
            self.draw_bird(sim.y, sim.rotation, sim.frame, BIRD);
        }

        match sim.phase {
            Phase::Start => self.draw_center_text("TAP TO START", 40.0, WHITE),
            Phase::Countdown => {
                let remaining = sim.countdown_display();
                let text = if remaining > 0 {
                    remaining.to_string()
                } else {
                    "GO!".to_string()
                };
                self.draw_center_text(&text, 100.0, GOLD);
            }
            Phase::Spectating => self.draw_center_text("Spectating...", 30.0, ORANGE),
            Phase::GameOver => {
                self.draw_center_text("GAME OVER", 48.0, RED);
                let line = format!(
                    "Score {}   Best {}",
                    sim.score.floor() as i64,
                    best_score.max(sim.score).floor() as i64
                );
                draw_text(
                    &line,
                    screen_width() / 2.0 - 100.0,
                    screen_height() / 2.0 + 50.0,
                    28.0,
                    WHITE,
                );
                draw_text(
                    "Space to restart",
                    screen_width() / 2.0 - 80.0,
                    screen_height() / 2.0 + 80.0,
                    22.0,
                    GRAY,
                );
            }
            _ => {}
        }

        if !matches!(sim.phase, Phase::Leaderboard | Phase::GameOver) {
            self.draw_score(sim.score);
        }

        self.draw_banner(banner);
    }

    fn draw_pipe(&self, pipe: &Pipe) {
        draw_rectangle(pipe.x, pipe.y, PIPE_WIDTH, PIPE_HEIGHT, PIPE_FILL);
        draw_rectangle_lines(pipe.x, pipe.y, PIPE_WIDTH, PIPE_HEIGHT, 2.0, PIPE_EDGE);
    }

    fn draw_bird(&self, y: f32, rotation: f32, frame: u64, color: Color) {
        let center = vec2(PLAYER_X + PLAYER_SIZE / 2.0, y + PLAYER_SIZE / 2.0);
        draw_rectangle_ex(
            center.x,
            center.y,
            PLAYER_SIZE,
            PLAYER_SIZE,
            DrawRectangleParams {
                offset: vec2(0.5, 0.5),
                rotation,
                color,
            },
        );
        // Wing flap: a small oscillating accent instead of sprite frames.
        let flap = if frame % 50 < 25 { -10.0 } else { 10.0 };
        draw_circle(center.x - 10.0, center.y + flap, 8.0, WHITE);
    }

    fn draw_score(&self, score: f32) {
        draw_text(&format!("{}", score.floor() as i64), 15.0, 50.0, 60.0, WHITE);
    }

    fn draw_center_text(&self, text: &str, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(
            text,
            (screen_width() - dims.width) / 2.0,
            screen_height() / 2.0,
            size,
            color,
        );
    }

    /// Transient error banner; the caller decides when it expires.
    fn draw_banner(&self, banner: Option<&str>) {
        if let Some(message) = banner {
            let dims = measure_text(message, None, 26, 1.0);
            draw_rectangle(
                (screen_width() - dims.width) / 2.0 - 10.0,
                60.0,
                dims.width + 20.0,
                40.0,
                Color::new(0.7, 0.1, 0.1, 0.9),
            );
            draw_text(
                message,
                (screen_width() - dims.width) / 2.0,
                86.0,
                26.0,
                WHITE,
            );
        }
    }

    /// Lobby: room code plus the roster with ready/dead markers.
    pub fn render_lobby(
        &self,
        room_id: &str,
        roster: &HashMap<u32, Player>,
        local_id: Option<u32>,
        banner: Option<&str>,
    ) {
        clear_background(SKY);
        self.draw_center_text(&format!("Room {}", room_id), 48.0, GOLD);

        let mut names: Vec<&Player> = roster.values().collect();
        names.sort_by_key(|p| p.id);
        let mut y = screen_height() / 2.0 + 40.0;
        for player in names {
            let you = if Some(player.id) == local_id { " (you)" } else { "" };
            let status = if player.is_dead { "dead" } else { "ready" };
            draw_text(
                &format!("{}{} - {}", player.name, you, status),
                screen_width() / 2.0 - 120.0,
                y,
                26.0,
                WHITE,
            );
            y += 30.0;
        }
        draw_text(
            "Enter to start",
            screen_width() / 2.0 - 80.0,
            y + 20.0,
            22.0,
            GRAY,
        );
        self.draw_banner(banner);
    }

    /// Final ranking table, best first.
    pub fn render_leaderboard(&self, ranking: &[Player], banner: Option<&str>) {
        clear_background(SKY);
        self.draw_center_text("RESULTS", 48.0, GOLD);

        let mut y = screen_height() / 2.0;
        for (index, player) in ranking.iter().enumerate() {
            draw_text(
                &format!(
                    "#{}  {}  {}",
                    index + 1,
                    player.name,
                    player.score.floor() as i64
                ),
                screen_width() / 2.0 - 120.0,
                y,
                28.0,
                WHITE,
            );
            y += 32.0;
        }
        draw_text(
            "Enter to play again",
            screen_width() / 2.0 - 90.0,
            y + 20.0,
            22.0,
            GRAY,
        );
        self.draw_banner(banner);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
