use clap::Parser;
use log::{info, warn};
use macroquad::prelude::*;
use ::rand::Rng;

use client::game::{FixedTimestep, LocalSim, Phase};
use client::input::InputManager;
use client::network::{NetEvent, NetworkClient};
use client::remote::RemoteRoster;
use client::rendering::Renderer;
use client::storage;
use shared::{ClientMessage, Player, ServerMessage, BOARD_HEIGHT};
use std::collections::HashMap;

const BANNER_SECS: f64 = 3.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server websocket URL
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// Display name (random if omitted)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Create a new multiplayer room
    #[arg(short = 'c', long)]
    create: bool,

    /// Join an existing room by code
    #[arg(short = 'j', long)]
    join: Option<String>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Skydash".to_owned(),
        window_width: 1024,
        window_height: BOARD_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

fn random_name() -> String {
    let animals = ["Dragon", "Falcon", "Otter", "Lynx", "Raven", "Badger"];
    let mut rng = ::rand::thread_rng();
    format!(
        "{} {}",
        animals[rng.gen_range(0..animals.len())],
        rng.gen_range(10..100)
    )
}

struct Session {
    net: Option<NetworkClient>,
    my_id: Option<u32>,
    room_id: Option<String>,
    roster: HashMap<u32, Player>,
    ranking: Vec<Player>,
    banner: Option<(String, f64)>,
    in_lobby: bool,
}

impl Session {
    fn show_banner(&mut self, message: String) {
        warn!("{}", message);
        self.banner = Some((message, get_time()));
    }

    fn banner_text(&mut self) -> Option<&str> {
        if let Some((_, shown_at)) = self.banner {
            if get_time() - shown_at > BANNER_SECS {
                self.banner = None;
            }
        }
        self.banner.as_ref().map(|(text, _)| text.as_str())
    }

    fn send(&self, message: ClientMessage) {
        if let Some(net) = &self.net {
            net.send(message);
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();
    let name = args.name.clone().unwrap_or_else(random_name);
    let multiplayer = args.create || args.join.is_some();

    let mut session = Session {
        net: None,
        my_id: None,
        room_id: None,
        roster: HashMap::new(),
        ranking: Vec::new(),
        banner: None,
        in_lobby: false,
    };

    if multiplayer {
        match NetworkClient::connect(&args.server) {
            Ok(net) => {
                info!("Connected to {}", args.server);
                if let Some(code) = &args.join {
                    let room_id = code.to_uppercase();
                    net.send(ClientMessage::JoinRoom {
                        room_id: room_id.clone(),
                        name: name.clone(),
                    });
                    session.room_id = Some(room_id);
                } else {
                    net.send(ClientMessage::CreateRoom { name: name.clone() });
                }
                session.net = Some(net);
                session.in_lobby = true;
            }
            Err(e) => {
                session.show_banner(format!("Connection failed: {}", e));
            }
        }
    }

    let mut sim = LocalSim::new(multiplayer);
    let mut remotes = RemoteRoster::new();
    let mut timestep = FixedTimestep::new();
    let mut input = InputManager::new();
    let renderer = Renderer::new();
    let mut best_score = storage::load_best_score();

    if !multiplayer {
        sim.begin_start();
    }

    loop {
        while let Some(event) = session.net.as_ref().and_then(|n| n.poll()) {
            match event {
                NetEvent::Message(msg) => {
                    handle_server_message(msg, &mut session, &mut sim, &mut remotes)
                }
                NetEvent::Disconnected => {
                    session.show_banner("Disconnected from server".to_string());
                    session.net = None;
                }
            }
        }

        let events = input.poll();
        if events.jump {
            match sim.phase {
                Phase::GameOver if !sim.is_multiplayer() => {
                    sim.begin_start();
                    timestep.reset();
                }
                _ => sim.jump(),
            }
        }
        if events.start && (session.in_lobby || sim.phase == Phase::Leaderboard) {
            if let Some(room_id) = session.room_id.clone() {
                session.send(ClientMessage::StartGameRequest { room_id });
            }
        }

        let steps = timestep.advance(get_frame_time() * 1000.0);
        for _ in 0..steps {
            let out = sim.fixed_step(::rand::random::<f32>());
            if let Some(report) = out.report {
                if let Some(room_id) = session.room_id.clone() {
                    session.send(ClientMessage::UpdatePosition {
                        room_id,
                        y: report.y,
                        rotation: report.rotation,
                        score: report.score,
                    });
                }
            }
            if out.died {
                if sim.score > best_score {
                    best_score = sim.score;
                    storage::save_best_score(best_score);
                }
                if sim.is_multiplayer() {
                    if let Some(room_id) = session.room_id.clone() {
                        session.send(ClientMessage::PlayerDied { room_id });
                    }
                }
            }
        }

        remotes.interpolate();

        let banner = session.banner_text().map(|s| s.to_owned());
        if session.in_lobby {
            renderer.render_lobby(
                session.room_id.as_deref().unwrap_or("....."),
                &session.roster,
                session.my_id,
                banner.as_deref(),
            );
        } else if sim.phase == Phase::Leaderboard {
            renderer.render_leaderboard(&session.ranking, banner.as_deref());
        } else {
            renderer.render(&sim, &remotes, best_score, banner.as_deref());
        }

        next_frame().await;
    }
}

fn handle_server_message(
    msg: ServerMessage,
    session: &mut Session,
    sim: &mut LocalSim,
    remotes: &mut RemoteRoster,
) {
    match msg {
        ServerMessage::Connected { id } => {
            session.my_id = Some(id);
        }
        ServerMessage::RoomCreated { room_id } => {
            info!("Room created: {}", room_id);
            session.room_id = Some(room_id);
            session.in_lobby = true;
        }
        ServerMessage::UpdatePlayers { players } => {
            remotes.apply_roster(&players, session.my_id);
            session.roster = players;
        }
        ServerMessage::GameStarted => {
            session.in_lobby = false;
            sim.begin_countdown();
            remotes.clear();
        }
        ServerMessage::SpawnPipe { y } => {
            sim.spawn_pipe_pair(y);
        }
        ServerMessage::PlayerMoved { player } => {
            if Some(player.id) != session.my_id {
                remotes.apply_move(&player);
            }
        }
        ServerMessage::PlayerStatusUpdate { id, is_dead } => {
            remotes.set_dead(id, is_dead);
        }
        ServerMessage::ShowLeaderboard { ranking } => {
            session.ranking = ranking;
            sim.enter_leaderboard();
        }
        ServerMessage::ErrorMessage { message } => {
            session.show_banner(message);
        }
    }
}
