//! Remote player smoothing.
//!
//! Roommates report state once per fixed step at best, and the network
//! delivers those reports unevenly. Displayed values therefore approach
//! the newest target exponentially once per rendered frame, decoupling
//! remote visual smoothness from the update cadence.

use shared::{Player, REMOTE_SMOOTHING};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub name: String,
    pub displayed_y: f32,
    pub displayed_rotation: f32,
    target_y: f32,
    target_rotation: f32,
    pub score: f32,
    pub is_dead: bool,
}

impl RemotePlayer {
    /// First sighting: display exactly where the player reported, no
    /// interpolation from an undefined prior state.
    fn from_report(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            displayed_y: player.y,
            displayed_rotation: player.rotation,
            target_y: player.y,
            target_rotation: player.rotation,
            score: player.score,
            is_dead: player.is_dead,
        }
    }
}

#[derive(Default)]
pub struct RemoteRoster {
    players: HashMap<u32, RemotePlayer>,
}

impl RemoteRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a full roster snapshot: unseen roommates appear, departed
    /// ones disappear. The local player is never tracked here.
    pub fn apply_roster(&mut self, snapshot: &HashMap<u32, Player>, local_id: Option<u32>) {
        for (id, player) in snapshot {
            if Some(*id) == local_id {
                continue;
            }
            self.players
                .entry(*id)
                .and_modify(|existing| {
                    existing.name = player.name.clone();
                    existing.is_dead = player.is_dead;
                })
                .or_insert_with(|| RemotePlayer::from_report(player));
        }
        self.players.retain(|id, _| snapshot.contains_key(id));
    }

    /// Applies one movement rebroadcast: retargets if known, snaps in a
    /// newly sighted player otherwise.
    pub fn apply_move(&mut self, player: &Player) {
        match self.players.get_mut(&player.id) {
            Some(remote) => {
                remote.target_y = player.y;
                remote.target_rotation = player.rotation;
                remote.score = player.score;
                remote.is_dead = player.is_dead;
            }
            None => {
                self.players.insert(player.id, RemotePlayer::from_report(player));
            }
        }
    }

    pub fn set_dead(&mut self, id: u32, is_dead: bool) {
        if let Some(remote) = self.players.get_mut(&id) {
            remote.is_dead = is_dead;
        }
    }

    /// One rendered frame of exponential approach toward the targets.
    pub fn interpolate(&mut self) {
        for remote in self.players.values_mut() {
            remote.displayed_y += (remote.target_y - remote.displayed_y) * REMOTE_SMOOTHING;
            remote.displayed_rotation +=
                (remote.target_rotation - remote.displayed_rotation) * REMOTE_SMOOTHING;
        }
    }

    /// Remote players to draw; dead roommates are not rendered.
    pub fn visible(&self) -> impl Iterator<Item = &RemotePlayer> {
        self.players.values().filter(|p| !p.is_dead)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &RemotePlayer)> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}
