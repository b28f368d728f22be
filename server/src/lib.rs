//! # Game Server Library
//!
//! Authoritative coordination server for the multiplayer obstacle game.
//! The server never simulates physics or arbitrates collisions; each
//! client is locally authoritative for its own outcome. What the server
//! owns is everything that must look identical across clients:
//!
//! - **Room lifecycle**: creation, membership, start/round transitions
//!   and teardown, so every client agrees on who is in the session.
//! - **Obstacle timing and placement**: a single per-room spawn loop is
//!   the only source of spawn events, preventing obstacle drift between
//!   clients running at different frame rates.
//! - **State relay**: per-step position reports are rebroadcast to
//!   roommates, and death reports are aggregated into a final ranking.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! The explicitly owned room table. Every protocol operation mutates
//! state through it, and it addresses clients only through per-connection
//! channel senders, so the whole thing is unit-testable without a socket.
//!
//! ### Room Module (`room`)
//! A single session: code, roster, lifecycle state, difficulty
//! high-water mark, and the spawn task handle the room owns exclusively.
//!
//! ### Spawner Module (`spawner`)
//! The self-rescheduling obstacle spawn loop. Re-validates the room's
//! existence, state and round on every tick so a cancelled or stale loop
//! can never act on a reset or deleted room.
//!
//! ### Network Module (`network`)
//! WebSocket accept loop and per-connection read/write tasks bridging
//! JSON frames to registry calls.

pub mod network;
pub mod registry;
pub mod room;
pub mod spawner;
