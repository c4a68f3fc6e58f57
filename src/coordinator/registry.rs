use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::ParticipantInfo;

/// Ordered view of a room's members, in join order.
pub type RosterSnapshot = Vec<ParticipantInfo>;

/// Room ids are matched case-insensitively; the registry stores them uppercased.
pub fn normalize_room_id(room_id: &str) -> String {
    room_id.trim().to_uppercase()
}

#[derive(Debug, Clone)]
struct Participant {
    name: String,
    joined_at: DateTime<Utc>,
    // Monotonic per-registry join sequence; gives the roster a stable order
    // even when two joins land in the same millisecond.
    seq: u64,
}

#[derive(Debug, Default)]
struct Room {
    participants: HashMap<Uuid, Participant>,
    code: String,
}

/// In-memory registry of live rooms and their members.
///
/// All operations are plain map/string updates with no suspension point.
/// A room exists here if and only if it has at least one member: the first
/// join creates it, removal of the last member deletes it together with its
/// code buffer in the same call.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    /// connection id -> room id the connection currently belongs to
    memberships: HashMap<Uuid, String>,
    join_seq: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) a participant in a room, creating the room if
    /// absent. Re-joining the same room replaces the record in place, keeping
    /// its roster position. Returns the normalized room id and updated roster.
    ///
    /// The caller is responsible for removing the connection from any other
    /// room first; a connection belongs to at most one room.
    pub fn join(&mut self, room_id: &str, connection_id: Uuid, name: &str) -> (String, RosterSnapshot) {
        let room_id = normalize_room_id(room_id);
        let room = self.rooms.entry(room_id.clone()).or_default();

        match room.participants.get_mut(&connection_id) {
            Some(existing) => {
                existing.name = name.to_string();
            }
            None => {
                self.join_seq += 1;
                room.participants.insert(
                    connection_id,
                    Participant {
                        name: name.to_string(),
                        joined_at: Utc::now(),
                        seq: self.join_seq,
                    },
                );
            }
        }
        self.memberships.insert(connection_id, room_id.clone());

        let roster = roster_of(room);
        (room_id, roster)
    }

    /// Remove a connection from whatever room it belongs to. Returns the room
    /// id and the remaining roster, or `None` if the connection was never
    /// joined. Deletes the room (roster and code buffer together) when the
    /// last member leaves.
    pub fn leave(&mut self, connection_id: Uuid) -> Option<(String, RosterSnapshot)> {
        let room_id = self.memberships.remove(&connection_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        room.participants.remove(&connection_id);

        if room.participants.is_empty() {
            self.rooms.remove(&room_id);
            return Some((room_id, Vec::new()));
        }

        let roster = roster_of(room);
        Some((room_id, roster))
    }

    /// Room the connection currently belongs to, if any.
    pub fn room_of(&self, connection_id: Uuid) -> Option<&str> {
        self.memberships.get(&connection_id).map(String::as_str)
    }

    /// Display name a connection joined under, if it is in a room.
    pub fn name_of(&self, connection_id: Uuid) -> Option<&str> {
        let room_id = self.memberships.get(&connection_id)?;
        let room = self.rooms.get(room_id)?;
        room.participants
            .get(&connection_id)
            .map(|p| p.name.as_str())
    }

    /// Overwrite a room's code buffer. Last write wins; unknown rooms are a
    /// no-op since a buffer only lives as long as its room.
    pub fn set_code(&mut self, room_id: &str, code: &str) {
        if let Some(room) = self.rooms.get_mut(&normalize_room_id(room_id)) {
            room.code = code.to_string();
        }
    }

    /// Current code buffer, or `None` for an unknown room.
    pub fn get_code(&self, room_id: &str) -> Option<&str> {
        self.rooms
            .get(&normalize_room_id(room_id))
            .map(|room| room.code.as_str())
    }

    /// Read-only roster snapshot, or `None` for an unknown room.
    pub fn list_participants(&self, room_id: &str) -> Option<RosterSnapshot> {
        self.rooms
            .get(&normalize_room_id(room_id))
            .map(roster_of)
    }

    /// Member connection ids of a room, used for broadcast fan-out.
    pub fn member_ids(&self, room_id: &str) -> Vec<Uuid> {
        self.rooms
            .get(&normalize_room_id(room_id))
            .map(|room| room.participants.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn participant_count(&self) -> usize {
        self.memberships.len()
    }

    #[cfg(test)]
    pub fn room_exists(&self, room_id: &str) -> bool {
        self.rooms.contains_key(&normalize_room_id(room_id))
    }
}

fn roster_of(room: &Room) -> RosterSnapshot {
    let mut members: Vec<(&Uuid, &Participant)> = room.participants.iter().collect();
    members.sort_by_key(|(_, p)| p.seq);
    members
        .into_iter()
        .map(|(id, p)| ParticipantInfo {
            connection_id: *id,
            name: p.name.clone(),
            joined_at: p.joined_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(roster: &RosterSnapshot) -> Vec<&str> {
        roster.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn join_creates_room_and_returns_roster() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        let (room_id, roster) = reg.join("abcd1234", alice, "Alice");
        assert_eq!(room_id, "ABCD1234");
        assert_eq!(names(&roster), vec!["Alice"]);
        assert!(reg.room_exists("abcd1234"));
    }

    #[test]
    fn room_ids_are_case_insensitive() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        reg.join("abcd1234", alice, "Alice");
        let (_, roster) = reg.join("ABCD1234", bob, "Bob");
        assert_eq!(names(&roster), vec!["Alice", "Bob"]);
        assert_eq!(reg.room_count(), 1);
    }

    #[test]
    fn rejoin_overwrites_instead_of_duplicating() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        reg.join("R1", alice, "Alice");
        let (_, roster) = reg.join("R1", alice, "Alice A.");
        assert_eq!(names(&roster), vec!["Alice A."]);
        assert_eq!(reg.participant_count(), 1);
    }

    #[test]
    fn rejoin_keeps_roster_position() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        reg.join("R1", alice, "Alice");
        reg.join("R1", bob, "Bob");
        let (_, roster) = reg.join("R1", alice, "Alice");
        assert_eq!(names(&roster), vec!["Alice", "Bob"]);
    }

    #[test]
    fn roster_is_in_join_order() {
        let mut reg = RoomRegistry::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            reg.join("R1", *id, &format!("user{i}"));
        }
        let roster = reg.list_participants("R1").unwrap();
        assert_eq!(
            names(&roster),
            vec!["user0", "user1", "user2", "user3", "user4"]
        );
    }

    #[test]
    fn leave_removes_participant() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        reg.join("R1", alice, "Alice");
        reg.join("R1", bob, "Bob");

        let (room_id, roster) = reg.leave(bob).unwrap();
        assert_eq!(room_id, "R1");
        assert_eq!(names(&roster), vec!["Alice"]);
    }

    #[test]
    fn leave_of_unjoined_connection_is_noop() {
        let mut reg = RoomRegistry::new();
        assert!(reg.leave(Uuid::new_v4()).is_none());
    }

    #[test]
    fn last_leave_deletes_room_state_atomically() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        reg.join("R1", alice, "Alice");
        reg.set_code("R1", "print(1)");

        let (_, roster) = reg.leave(alice).unwrap();
        assert!(roster.is_empty());
        assert!(!reg.room_exists("R1"));
        assert!(reg.get_code("R1").is_none());
        assert!(reg.list_participants("R1").is_none());

        // A fresh join to the same id starts with an empty buffer.
        reg.join("R1", Uuid::new_v4(), "Bob");
        assert_eq!(reg.get_code("R1"), Some(""));
    }

    #[test]
    fn set_code_on_unknown_room_is_noop() {
        let mut reg = RoomRegistry::new();
        reg.set_code("NOPE", "x");
        assert!(reg.get_code("NOPE").is_none());
        assert_eq!(reg.room_count(), 0);
    }

    #[test]
    fn code_buffer_is_last_write_wins() {
        let mut reg = RoomRegistry::new();
        reg.join("R1", Uuid::new_v4(), "Alice");
        reg.set_code("R1", "a");
        reg.set_code("r1", "b");
        assert_eq!(reg.get_code("R1"), Some("b"));
    }

    #[test]
    fn name_lookup_follows_membership() {
        let mut reg = RoomRegistry::new();
        let alice = Uuid::new_v4();
        reg.join("R1", alice, "Alice");
        assert_eq!(reg.name_of(alice), Some("Alice"));
        reg.leave(alice);
        assert_eq!(reg.name_of(alice), None);
    }
}
