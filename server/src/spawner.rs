//! Per-room obstacle spawn loop.
//!
//! One task per playing room. The loop never trusts its own liveness:
//! every firing goes back through the registry, which checks that the
//! room still exists, is still playing and is still on the round this
//! loop was started for. The room additionally owns the task's
//! `JoinHandle` and aborts it on every round-ending path, so a stale
//! callback can neither fire nor re-arm.

use crate::registry::SharedRegistry;
use log::debug;
use std::time::Duration;

/// Runs a room's spawn loop: waits out the start-of-round countdown,
/// then alternates one spawn broadcast with a difficulty-derived sleep
/// until the registry reports the round over.
pub async fn run_spawn_loop(
    registry: SharedRegistry,
    room_id: String,
    round: u64,
    countdown: Duration,
) {
    tokio::time::sleep(countdown).await;

    loop {
        let next = {
            let mut registry = registry.write().await;
            registry.spawn_tick(&room_id, round, rand::random::<f32>())
        };

        match next {
            Some(interval) => tokio::time::sleep(interval).await,
            None => {
                debug!("Spawn loop for room {} round {} stopping", room_id, round);
                break;
            }
        }
    }
}
