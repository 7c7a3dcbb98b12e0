//! Room registry: owns the room map and the quick-match pointer.

use std::collections::HashMap;

use duelforge_protocol::RoomCode;

use crate::Room;

/// Owns every live [`Room`] and the single "open matchmaking slot"
/// pointer used by anonymous quick-match.
///
/// The registry is the exclusive owner of room state — other components
/// reach rooms only through it, and hold no long-lived references into
/// a room's internals.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,

    /// At most one room with exactly one player waiting for quick-match.
    /// Cleared when that room reaches 2 players or 0 players. Rooms
    /// hosted with a shareable code never land here.
    open_room: Option<RoomCode>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent creation: returns the existing room or inserts a fresh
    /// one (empty seats, round 1, no submissions).
    pub fn ensure(&mut self, code: &RoomCode) -> &mut Room {
        if !self.rooms.contains_key(code) {
            tracing::info!(room = %code, "room created");
        }
        self.rooms
            .entry(code.clone())
            .or_insert_with(|| Room::new(code.clone()))
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Occupancy of a room; 0 for unknown codes.
    pub fn player_count(&self, code: &RoomCode) -> usize {
        self.rooms.get(code).map_or(0, Room::player_count)
    }

    /// Removes the room if it has no occupants. Clears the quick-match
    /// pointer when it referenced this room. Returns `true` if removed.
    pub fn destroy_if_empty(&mut self, code: &RoomCode) -> bool {
        let empty = self
            .rooms
            .get(code)
            .is_some_and(|r| r.player_count() == 0);
        if empty {
            self.rooms.remove(code);
            self.clear_open_room_if(code);
            tracing::info!(room = %code, "room destroyed");
        }
        empty
    }

    /// Produces a fresh short room code. Collision probability is
    /// negligible at this scale; callers do not retry.
    pub fn generate_code(&self) -> RoomCode {
        RoomCode::generate()
    }

    /// The room currently waiting for a quick-match partner, if any.
    pub fn open_room(&self) -> Option<&RoomCode> {
        self.open_room.as_ref()
    }

    /// Marks a room as the quick-match target, replacing any previous
    /// pointer (the pointer tracks the most recently created waiting room).
    pub fn set_open_room(&mut self, code: RoomCode) {
        self.open_room = Some(code);
    }

    /// Clears the pointer only if it references the given room.
    pub fn clear_open_room_if(&mut self, code: &RoomCode) {
        if self.open_room.as_ref() == Some(code) {
            self.open_room = None;
        }
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
