//! # Game Client Library
//!
//! Client for the multiplayer obstacle game. The client is locally
//! authoritative for its own character: it integrates physics, detects
//! collisions and awards its own score, reporting results to the server
//! rather than asking it. What it consumes from the server is the shared
//! picture: roster changes, authoritative obstacle spawns and the other
//! players' reported states.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The fixed-timestep local simulation: the client state machine, the
//! accumulator that decouples the 60 Hz physics rate from the rendering
//! framerate, obstacle motion and culling, scoring and collision.
//!
//! ### Remote Module (`remote`)
//! Smooths the sparse, network-cadence position reports of roommates
//! into continuous per-frame motion via exponential approach.
//!
//! ### Network Module (`network`)
//! WebSocket bridge running on a background runtime thread, exchanging
//! protocol messages with the render loop over channels.
//!
//! ### Input Module (`input`)
//! Edge-detected keyboard and mouse sampling.
//!
//! ### Rendering Module (`rendering`)
//! Immediate-mode drawing of the world, HUD, lobby and leaderboard.
//!
//! ### Storage Module (`storage`)
//! The single persisted value: the local best score.

pub mod game;
pub mod input;
pub mod network;
pub mod remote;
pub mod rendering;
pub mod storage;
