//! WebSocket layer bridging JSON frames to registry operations.
//!
//! One task per connection reads frames, one forwards that connection's
//! outbound channel into its sink. All state mutation happens inside
//! registry calls under the write lock; the network layer itself keeps
//! no game state.

use crate::registry::{Registry, SharedRegistry};
use crate::spawner;
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{ClientMessage, ServerMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Accepting server: a bound listener plus the registry every connection
/// shares.
pub struct Server {
    listener: TcpListener,
    registry: SharedRegistry,
    countdown: Duration,
}

impl Server {
    /// Binds the listener. `countdown` is the delay between a start
    /// signal and the first obstacle spawn (3 seconds in production,
    /// shorter in tests).
    pub async fn bind(
        addr: &str,
        countdown: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        Ok(Server {
            listener,
            registry: Registry::new_shared(),
            countdown,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Accept loop. Runs until the process is shut down.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let registry = self.registry.clone();
            let countdown = self.countdown;
            tokio::spawn(async move {
                handle_connection(stream, peer, registry, countdown).await;
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: SharedRegistry,
    countdown: Duration,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };
    let (mut sink, mut frames) = ws.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn_id = registry.write().await.register(tx);
    info!("Connection {} established from {}", conn_id, peer);

    // Forwards this connection's outbound queue into the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => dispatch(&registry, conn_id, message, countdown).await,
                Err(e) => warn!("Connection {}: rejected malformed message: {}", conn_id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // Ping/pong handled by the protocol layer.
            Err(e) => {
                warn!("Connection {} transport error: {}", conn_id, e);
                break;
            }
        }
    }

    // Lost connections take the same cleanup path as a voluntary leave.
    registry.write().await.unregister(conn_id);
    writer.abort();
    info!("Connection {} closed", conn_id);
}

async fn dispatch(
    registry: &SharedRegistry,
    conn_id: u32,
    message: ClientMessage,
    countdown: Duration,
) {
    match message {
        ClientMessage::CreateRoom { name } => {
            registry.write().await.create_room(conn_id, name);
        }
        ClientMessage::JoinRoom { room_id, name } => {
            registry.write().await.join_room(conn_id, &room_id, name);
        }
        ClientMessage::StartGameRequest { room_id } => {
            let started = registry.write().await.start_game(&room_id);
            if let Some(round) = started {
                let handle = tokio::spawn(spawner::run_spawn_loop(
                    registry.clone(),
                    room_id.clone(),
                    round,
                    countdown,
                ));
                registry
                    .write()
                    .await
                    .attach_spawn_task(&room_id, round, handle);
            }
        }
        ClientMessage::UpdatePosition {
            room_id,
            y,
            rotation,
            score,
        } => {
            registry
                .write()
                .await
                .update_position(conn_id, &room_id, y, rotation, score);
        }
        ClientMessage::PlayerDied { room_id } => {
            registry.write().await.player_died(conn_id, &room_id);
        }
        ClientMessage::LeaveRoom => {
            registry.write().await.leave_room(conn_id);
        }
    }
}
