//! A single multiplayer session and its roster.

use shared::Player;
use std::collections::HashMap;
use tokio::task::JoinHandle;

pub const ROOM_CODE_LEN: usize = 5;
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Room lifecycle. A room is created in `Waiting`, becomes `Playing` on a
/// start request and `GameOver` once every member has reported death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Playing,
    GameOver,
}

#[derive(Debug)]
struct Slot {
    player: Player,
    /// Join order, used as the stable tie-break when ranking equal scores.
    join_seq: u64,
}

/// One room: roster, lifecycle state, the difficulty high-water mark and
/// the spawn task the room owns exclusively.
pub struct Room {
    pub code: String,
    pub state: RoomState,
    slots: HashMap<u32, Slot>,
    next_join_seq: u64,
    /// Highest score any member has reported this round. Never decreases
    /// until the next round reset; drives spawn pacing only.
    pub current_max_score: f32,
    /// Round generation. Bumped on every start so spawn loops from a
    /// previous round identify themselves as stale.
    pub round: u64,
    spawn_task: Option<JoinHandle<()>>,
}

impl Room {
    pub fn new(code: String) -> Self {
        Self {
            code,
            state: RoomState::Waiting,
            slots: HashMap::new(),
            next_join_seq: 0,
            current_max_score: 0.0,
            round: 0,
            spawn_task: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= shared::MAX_PLAYERS_PER_ROOM
    }

    pub fn contains(&self, conn_id: u32) -> bool {
        self.slots.contains_key(&conn_id)
    }

    pub fn insert_player(&mut self, conn_id: u32, player: Player) {
        let join_seq = self.next_join_seq;
        self.next_join_seq += 1;
        self.slots.insert(conn_id, Slot { player, join_seq });
    }

    pub fn remove_player(&mut self, conn_id: u32) -> bool {
        self.slots.remove(&conn_id).is_some()
    }

    pub fn player_mut(&mut self, conn_id: u32) -> Option<&mut Player> {
        self.slots.get_mut(&conn_id).map(|s| &mut s.player)
    }

    pub fn player(&self, conn_id: u32) -> Option<&Player> {
        self.slots.get(&conn_id).map(|s| &s.player)
    }

    pub fn member_ids(&self) -> Vec<u32> {
        self.slots.keys().copied().collect()
    }

    /// Full roster snapshot for an `update_players` broadcast.
    pub fn roster(&self) -> HashMap<u32, Player> {
        self.slots
            .iter()
            .map(|(id, slot)| (*id, slot.player.clone()))
            .collect()
    }

    /// Puts the room into a fresh round: everyone alive, all scores and
    /// the difficulty high-water mark back to zero.
    pub fn reset_round(&mut self) {
        self.state = RoomState::Playing;
        self.current_max_score = 0.0;
        self.round += 1;
        for slot in self.slots.values_mut() {
            slot.player.is_dead = false;
            slot.player.score = 0.0;
        }
    }

    /// Records one member's reported state and bumps the high-water mark
    /// if the reported score exceeds it. Values are trusted as-is.
    pub fn record_position(&mut self, conn_id: u32, y: f32, rotation: f32, score: f32) -> Option<Player> {
        let slot = self.slots.get_mut(&conn_id)?;
        slot.player.y = y;
        slot.player.rotation = rotation;
        slot.player.score = score;
        if score > self.current_max_score {
            self.current_max_score = score;
        }
        Some(slot.player.clone())
    }

    /// Marks a member dead. Returns false if unknown or already dead, so
    /// a death is processed exactly once per round.
    pub fn mark_dead(&mut self, conn_id: u32) -> bool {
        match self.slots.get_mut(&conn_id) {
            Some(slot) if !slot.player.is_dead => {
                slot.player.is_dead = true;
                true
            }
            _ => false,
        }
    }

    pub fn all_dead(&self) -> bool {
        self.slots.values().all(|s| s.player.is_dead)
    }

    /// Final ranking: descending by score, ties keep roster join order.
    pub fn ranking(&self) -> Vec<Player> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by(|a, b| {
            b.player
                .score
                .partial_cmp(&a.player.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.join_seq.cmp(&b.join_seq))
        });
        slots.iter().map(|s| s.player.clone()).collect()
    }

    pub fn attach_spawn_task(&mut self, handle: JoinHandle<()>) {
        self.cancel_spawn_task();
        self.spawn_task = Some(handle);
    }

    /// Aborts the spawn loop if one is running. Reachable from every
    /// path that ends a round: all-dead completion, a new start request,
    /// and disconnect-triggered teardown.
    pub fn cancel_spawn_task(&mut self) {
        if let Some(handle) = self.spawn_task.take() {
            handle.abort();
        }
    }
}

impl Drop for Room {
    fn drop(&mut self) {
        self.cancel_spawn_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(names: &[&str]) -> Room {
        let mut room = Room::new("TEST1".to_string());
        for (i, name) in names.iter().enumerate() {
            room.insert_player(i as u32, Player::new(i as u32, name.to_string()));
        }
        room
    }

    #[test]
    fn test_max_score_is_monotonic() {
        let mut room = room_with(&["a"]);
        room.record_position(0, 100.0, 0.0, 5.0);
        assert_eq!(room.current_max_score, 5.0);
        room.record_position(0, 100.0, 0.0, 3.0);
        assert_eq!(room.current_max_score, 5.0);
        room.record_position(0, 100.0, 0.0, 7.5);
        assert_eq!(room.current_max_score, 7.5);
    }

    #[test]
    fn test_reset_round_clears_scores_and_deaths() {
        let mut room = room_with(&["a", "b"]);
        room.record_position(0, 0.0, 0.0, 12.0);
        room.mark_dead(0);
        room.mark_dead(1);
        room.reset_round();
        assert_eq!(room.state, RoomState::Playing);
        assert_eq!(room.current_max_score, 0.0);
        assert!(!room.all_dead());
        assert_eq!(room.player(0).unwrap().score, 0.0);
    }

    #[test]
    fn test_death_is_recorded_once() {
        let mut room = room_with(&["a"]);
        assert!(room.mark_dead(0));
        assert!(!room.mark_dead(0));
        assert!(!room.mark_dead(99));
    }

    #[test]
    fn test_ranking_descending_with_stable_ties() {
        let mut room = room_with(&["first", "second", "third"]);
        room.record_position(0, 0.0, 0.0, 4.0);
        room.record_position(1, 0.0, 0.0, 9.5);
        room.record_position(2, 0.0, 0.0, 4.0);

        let ranking = room.ranking();
        assert_eq!(ranking[0].name, "second");
        // Equal scores keep join order: "first" joined before "third".
        assert_eq!(ranking[1].name, "first");
        assert_eq!(ranking[2].name, "third");
    }

    #[test]
    fn test_capacity() {
        let mut room = room_with(&["a", "b", "c"]);
        assert!(!room.is_full());
        room.insert_player(3, Player::new(3, "d".to_string()));
        assert!(room.is_full());
    }
}
