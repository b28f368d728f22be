//! Wire protocol between client and server.
//!
//! Every message is one JSON text frame carrying a tagged variant, one
//! per protocol event. Unknown events or wrongly-typed fields fail serde
//! deserialization at the edge, so handlers only ever see well-formed
//! messages. Field values themselves (position, rotation, score) are
//! deliberately not range-checked: the server trusts its clients.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One player's last reported state, as stored and rebroadcast by the
/// server. Position, rotation and score are authoritative only on the
/// owning client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub y: f32,
    pub rotation: f32,
    pub score: f32,
    pub is_dead: bool,
}

impl Player {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            y: 0.0,
            rotation: 0.0,
            score: 0.0,
            is_dead: false,
        }
    }
}

/// Messages sent from a client to the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        room_id: String,
        name: String,
    },
    StartGameRequest {
        room_id: String,
    },
    /// Reported every fixed step while the sender is playing.
    UpdatePosition {
        room_id: String,
        y: f32,
        rotation: f32,
        score: f32,
    },
    PlayerDied {
        room_id: String,
    },
    LeaveRoom,
}

/// Messages sent from the server to one or more clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection: tells the client the id the
    /// server will know it by.
    Connected { id: u32 },
    /// Echoes the new room code to the creator only.
    RoomCreated { room_id: String },
    /// Full roster snapshot, sent room-wide on any membership change.
    UpdatePlayers { players: HashMap<u32, Player> },
    /// Signals every client in the room to reset and start its countdown.
    GameStarted,
    /// Authoritative obstacle placement; carries only the gap origin.
    SpawnPipe { y: f32 },
    /// Rebroadcast of another room member's reported state.
    PlayerMoved { player: Player },
    PlayerStatusUpdate { id: u32, is_dead: bool },
    /// Final ranking, ordered best first. Round is over.
    ShowLeaderboard { ranking: Vec<Player> },
    /// User-facing error, never fatal to the connection.
    ErrorMessage { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_roundtrip() {
        let msg = ClientMessage::UpdatePosition {
            room_id: "A3F7K".to_string(),
            y: 312.5,
            rotation: -0.4,
            score: 7.5,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_event_tag_names() {
        let json =
            serde_json::to_value(ClientMessage::CreateRoom { name: "A".into() }).unwrap();
        assert_eq!(json["event"], "create_room");

        let json = serde_json::to_value(ServerMessage::SpawnPipe { y: -200.0 }).unwrap();
        assert_eq!(json["event"], "spawn_pipe");
        assert_eq!(json["data"]["y"], -200.0);

        let json = serde_json::to_value(ServerMessage::GameStarted).unwrap();
        assert_eq!(json["event"], "game_started");
    }

    #[test]
    fn test_unknown_event_rejected() {
        let raw = r#"{"event":"teleport","data":{"x":1}}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }

    #[test]
    fn test_non_numeric_score_rejected() {
        let raw = r#"{"event":"update_position","data":{"room_id":"AB1CD","y":1.0,"rotation":0.0,"score":"lots"}}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }

    #[test]
    fn test_leaderboard_preserves_order() {
        let ranking = vec![
            Player {
                score: 12.0,
                ..Player::new(2, "B".into())
            },
            Player {
                score: 4.5,
                ..Player::new(1, "A".into())
            },
        ];
        let json = serde_json::to_string(&ServerMessage::ShowLeaderboard {
            ranking: ranking.clone(),
        })
        .unwrap();
        match serde_json::from_str::<ServerMessage>(&json).unwrap() {
            ServerMessage::ShowLeaderboard { ranking: back } => assert_eq!(back, ranking),
            other => panic!("wrong message type: {:?}", other),
        }
    }
}
