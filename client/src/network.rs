//! WebSocket bridge for the render loop.
//!
//! macroquad owns the main thread, so the socket lives on a background
//! tokio runtime thread. The render loop talks to it through channels:
//! non-blocking `poll` for inbound events, fire-and-forget `send` for
//! outbound messages. Reconnect policy is delegated to the transport;
//! when the connection drops, the loop surfaces one `Disconnected`
//! event and stops.

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{ClientMessage, ServerMessage};
use tokio::sync::mpsc as tokio_mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Inbound events as seen by the render loop.
#[derive(Debug)]
pub enum NetEvent {
    Message(ServerMessage),
    Disconnected,
}

pub struct NetworkClient {
    outgoing: tokio_mpsc::UnboundedSender<ClientMessage>,
    incoming: std::sync::mpsc::Receiver<NetEvent>,
}

impl NetworkClient {
    /// Spawns the connection thread. Connection failures surface later
    /// as a `Disconnected` event, not here.
    pub fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (out_tx, out_rx) = tokio_mpsc::unbounded_channel();
        let (in_tx, in_rx) = std::sync::mpsc::channel();
        let url = url.to_string();

        std::thread::Builder::new()
            .name("net".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to build network runtime: {}", e);
                        let _ = in_tx.send(NetEvent::Disconnected);
                        return;
                    }
                };
                runtime.block_on(run_connection(url, out_rx, in_tx));
            })?;

        Ok(NetworkClient {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }

    /// Queues a message; fire-and-forget, like every request in the
    /// protocol.
    pub fn send(&self, message: ClientMessage) {
        if self.outgoing.send(message).is_err() {
            warn!("Connection gone, dropping outbound message");
        }
    }

    /// Next inbound event, if one arrived since the last poll.
    pub fn poll(&self) -> Option<NetEvent> {
        self.incoming.try_recv().ok()
    }
}

async fn run_connection(
    url: String,
    mut outgoing: tokio_mpsc::UnboundedReceiver<ClientMessage>,
    incoming: std::sync::mpsc::Sender<NetEvent>,
) {
    let ws = match connect_async(&url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            error!("Failed to connect to {}: {}", url, e);
            let _ = incoming.send(NetEvent::Disconnected);
            return;
        }
    };
    info!("Connected to {}", url);
    let (mut sink, mut frames) = ws.split();

    loop {
        tokio::select! {
            message = outgoing.recv() => {
                let Some(message) = message else { break };
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize client message: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            frame = frames.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(message) => {
                                if incoming.send(NetEvent::Message(message)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Dropping malformed server message: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Transport error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!("Disconnected from {}", url);
    let _ = incoming.send(NetEvent::Disconnected);
}
