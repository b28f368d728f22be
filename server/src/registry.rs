//! Room registry: the explicitly owned table of live rooms and
//! connections that every protocol operation goes through.
//!
//! The registry addresses clients only through per-connection channel
//! senders, never sockets, so all of the session logic here runs in unit
//! tests without a live transport. The network layer holds it behind an
//! `Arc<RwLock<_>>`; each handler or timer callback takes the write lock,
//! runs to completion and releases it, which keeps per-room mutation free
//! of interleaving.

use crate::room::{Room, RoomState, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
use log::{debug, info, warn};
use rand::Rng;
use shared::difficulty::{gap_origin_y, spawn_interval_ms};
use shared::{Player, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Why a join attempt was refused. Surfaced to the joining client only,
/// as a transient user-facing message; never fatal to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    RoomNotFound,
    RoomFull,
    RoomInProgress,
}

impl JoinError {
    pub fn user_message(self) -> &'static str {
        match self {
            JoinError::RoomNotFound => "Room not found!",
            JoinError::RoomFull => "Room is full (max 4)!",
            JoinError::RoomInProgress => "Game in progress, cannot join!",
        }
    }
}

struct Connection {
    sender: UnboundedSender<ServerMessage>,
    /// The room this connection occupies, if any. At most one.
    room: Option<String>,
}

pub struct Registry {
    rooms: HashMap<String, Room>,
    connections: HashMap<u32, Connection>,
    next_conn_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            connections: HashMap::new(),
            next_conn_id: 1,
        }
    }

    pub fn new_shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Registers a connection and assigns its id. The sender is the only
    /// way the registry ever addresses this client.
    pub fn register(&mut self, sender: UnboundedSender<ServerMessage>) -> u32 {
        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;
        self.connections.insert(conn_id, Connection { sender, room: None });
        info!("Connection {} registered", conn_id);
        self.send_to(conn_id, ServerMessage::Connected { id: conn_id });
        conn_id
    }

    /// Removes a connection, running the same cleanup as a voluntary
    /// room exit first. Lost connections and leave_room share this path.
    pub fn unregister(&mut self, conn_id: u32) {
        self.leave_room(conn_id);
        if self.connections.remove(&conn_id).is_some() {
            info!("Connection {} removed", conn_id);
        }
    }

    /// Creates a room with a fresh code, joins the caller as its first
    /// member and echoes the code back to the creator only.
    pub fn create_room(&mut self, conn_id: u32, name: String) {
        let code = self.generate_room_code();
        self.rooms.insert(code.clone(), Room::new(code.clone()));
        info!("Room {} created by connection {}", code, conn_id);
        self.send_to(conn_id, ServerMessage::RoomCreated { room_id: code.clone() });
        self.add_to_room(conn_id, &code, name);
    }

    /// Adds the caller to an existing room, or tells it (and only it)
    /// why that was not possible.
    pub fn join_room(&mut self, conn_id: u32, room_id: &str, name: String) {
        let refusal = match self.rooms.get(room_id) {
            None => Some(JoinError::RoomNotFound),
            Some(room) if room.is_full() => Some(JoinError::RoomFull),
            Some(room) if room.state == RoomState::Playing => Some(JoinError::RoomInProgress),
            Some(_) => None,
        };

        if let Some(err) = refusal {
            debug!("Connection {} refused from room {}: {:?}", conn_id, room_id, err);
            self.send_to(
                conn_id,
                ServerMessage::ErrorMessage {
                    message: err.user_message().to_string(),
                },
            );
            return;
        }

        self.add_to_room(conn_id, room_id, name);
    }

    fn add_to_room(&mut self, conn_id: u32, room_id: &str, name: String) {
        // A connection occupies at most one room.
        self.leave_room(conn_id);

        if let Some(room) = self.rooms.get_mut(room_id) {
            room.insert_player(conn_id, Player::new(conn_id, name));
            if let Some(conn) = self.connections.get_mut(&conn_id) {
                conn.room = Some(room_id.to_string());
            }
            let roster = room.roster();
            info!(
                "Connection {} joined room {} ({} players)",
                conn_id,
                room_id,
                roster.len()
            );
            self.broadcast(room_id, ServerMessage::UpdatePlayers { players: roster });
        }
    }

    /// Removes the caller from whatever room it occupies. Remaining
    /// members get a roster update; an emptied room is torn down along
    /// with its spawn timer.
    pub fn leave_room(&mut self, conn_id: u32) {
        let Some(room_id) = self
            .connections
            .get_mut(&conn_id)
            .and_then(|c| c.room.take())
        else {
            return;
        };

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        room.remove_player(conn_id);

        if room.is_empty() {
            // Dropping the room aborts any spawn loop it still owns.
            room.cancel_spawn_task();
            self.rooms.remove(&room_id);
            info!("Room {} emptied and destroyed", room_id);
        } else {
            let roster = room.roster();
            self.broadcast(&room_id, ServerMessage::UpdatePlayers { players: roster });
        }
    }

    /// Begins a round: resets every member and the difficulty high-water
    /// mark, broadcasts the start signal and returns the new round
    /// generation so the caller can schedule the spawn loop. Any room
    /// member may request a start; there is no host role at the protocol
    /// level.
    pub fn start_game(&mut self, room_id: &str) -> Option<u64> {
        let room = self.rooms.get_mut(room_id)?;
        if room.state == RoomState::Playing {
            debug!("Start request for room {} ignored: already playing", room_id);
            return None;
        }
        room.cancel_spawn_task();
        room.reset_round();
        let round = room.round;
        info!("Room {} starting round {}", room_id, round);
        self.broadcast(room_id, ServerMessage::GameStarted);
        Some(round)
    }

    /// Hands the spawn loop's task handle to the room that owns it. A
    /// handle for a stale round is aborted instead of stored.
    pub fn attach_spawn_task(&mut self, room_id: &str, round: u64, handle: JoinHandle<()>) {
        match self.rooms.get_mut(room_id) {
            Some(room) if room.round == round && room.state == RoomState::Playing => {
                room.attach_spawn_task(handle);
            }
            _ => handle.abort(),
        }
    }

    /// One firing of a room's spawn loop. Re-validates that the room
    /// still exists, is still playing and still runs the same round, then
    /// broadcasts an obstacle placement and returns the delay before the
    /// next firing. `None` tells the loop to stop.
    pub fn spawn_tick(&mut self, room_id: &str, round: u64, rand01: f32) -> Option<Duration> {
        let room = self.rooms.get(room_id)?;
        if room.state != RoomState::Playing || room.round != round {
            return None;
        }

        let interval = spawn_interval_ms(room.current_max_score);
        let y = gap_origin_y(rand01);
        debug!(
            "Room {} spawn tick: y={:.1}, next in {}ms (max score {:.1})",
            room_id, y, interval, room.current_max_score
        );
        self.broadcast(room_id, ServerMessage::SpawnPipe { y });
        Some(Duration::from_millis(interval))
    }

    /// Stores one member's reported state and rebroadcasts it to every
    /// other member. Values are trusted as reported.
    pub fn update_position(&mut self, conn_id: u32, room_id: &str, y: f32, rotation: f32, score: f32) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let Some(player) = room.record_position(conn_id, y, rotation, score) else {
            return;
        };
        self.broadcast_except(room_id, ServerMessage::PlayerMoved { player }, conn_id);
    }

    /// Handles a death report. When the last living member dies the
    /// spawn loop is cancelled, the room transitions to game-over and
    /// the final ranking goes out to everyone.
    pub fn player_died(&mut self, conn_id: u32, room_id: &str) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if !room.mark_dead(conn_id) {
            return;
        }

        self.broadcast(
            room_id,
            ServerMessage::PlayerStatusUpdate {
                id: conn_id,
                is_dead: true,
            },
        );

        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if room.all_dead() {
            room.cancel_spawn_task();
            room.state = RoomState::GameOver;
            let ranking = room.ranking();
            info!("Room {} round over, {} ranked", room_id, ranking.len());
            self.broadcast(room_id, ServerMessage::ShowLeaderboard { ranking });
        }
    }

    fn generate_room_code(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn send_to(&self, conn_id: u32, message: ServerMessage) {
        if let Some(conn) = self.connections.get(&conn_id) {
            if conn.sender.send(message).is_err() {
                warn!("Connection {} unreachable, dropping message", conn_id);
            }
        }
    }

    fn broadcast(&self, room_id: &str, message: ServerMessage) {
        self.broadcast_inner(room_id, message, None);
    }

    fn broadcast_except(&self, room_id: &str, message: ServerMessage, exclude: u32) {
        self.broadcast_inner(room_id, message, Some(exclude));
    }

    fn broadcast_inner(&self, room_id: &str, message: ServerMessage, exclude: Option<u32>) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        for member in room.member_ids() {
            if Some(member) == exclude {
                continue;
            }
            self.send_to(member, message.clone());
        }
    }

    // Introspection used by the binary's status logging and by tests.

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_state(&self, room_id: &str) -> Option<RoomState> {
        self.rooms.get(room_id).map(|r| r.state)
    }

    pub fn room_len(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map(|r| r.len()).unwrap_or(0)
    }

    pub fn room_max_score(&self, room_id: &str) -> Option<f32> {
        self.rooms.get(room_id).map(|r| r.current_max_score)
    }

    pub fn room_of(&self, conn_id: u32) -> Option<&str> {
        self.connections
            .get(&conn_id)
            .and_then(|c| c.room.as_deref())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
