//! Per-room state: seats, round progression.

use duelforge_protocol::{ClientId, ConnectionId, PlayerMap, PlayerValues, RoomCode};

/// One player's place in a room.
///
/// `connection` is routing state only — it is replaced on reconnect and
/// never consulted for identity.
#[derive(Debug, Clone)]
pub struct Seat {
    pub client: ClientId,
    pub connection: ConnectionId,
    pub values: PlayerValues,
}

/// Round progression within a match.
///
/// Invariant: `submissions` stays within `[0, player count]`, and a
/// count of 2 is consumed by resolution before any further submission
/// is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    pub submissions: u8,
    pub number: u32,
}

impl RoundState {
    /// The state of a freshly opened match: no submissions, round 1.
    pub fn fresh() -> Self {
        Self { submissions: 0, number: 1 }
    }
}

/// The authoritative unit of matchmaking and combat state.
///
/// Seats are kept in join order; a room never holds more than
/// [`ROOM_CAPACITY`](crate::ROOM_CAPACITY) of them.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub seats: Vec<Seat>,
    pub round: RoundState,
}

impl Room {
    pub(crate) fn new(code: RoomCode) -> Self {
        Self {
            code,
            seats: Vec::with_capacity(crate::ROOM_CAPACITY),
            round: RoundState::fresh(),
        }
    }

    /// Number of occupied seats.
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Looks up a seat by client.
    pub fn seat(&self, client: &ClientId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.client == client)
    }

    /// Mutable seat lookup.
    pub fn seat_mut(&mut self, client: &ClientId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| &s.client == client)
    }

    /// Removes a client's seat. Returns `false` if they were not seated.
    pub(crate) fn remove_seat(&mut self, client: &ClientId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| &s.client != client);
        self.seats.len() != before
    }

    /// Clients currently seated, in join order.
    pub fn members(&self) -> Vec<ClientId> {
        self.seats.iter().map(|s| s.client.clone()).collect()
    }

    /// A wire-ready snapshot of every seat's values.
    pub fn snapshot(&self) -> PlayerMap {
        self.seats
            .iter()
            .map(|s| (s.client.clone(), s.values.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(id: &str) -> Seat {
        Seat {
            client: ClientId::from(id),
            connection: ConnectionId(1),
            values: PlayerValues::starting(10),
        }
    }

    #[test]
    fn test_round_state_fresh() {
        let round = RoundState::fresh();
        assert_eq!(round.submissions, 0);
        assert_eq!(round.number, 1);
    }

    #[test]
    fn test_members_preserve_join_order() {
        let mut room = Room::new(RoomCode::from("AB12"));
        room.seats.push(seat("first"));
        room.seats.push(seat("second"));
        assert_eq!(
            room.members(),
            vec![ClientId::from("first"), ClientId::from("second")]
        );
    }

    #[test]
    fn test_remove_seat_is_idempotent() {
        let mut room = Room::new(RoomCode::from("AB12"));
        room.seats.push(seat("p1"));
        assert!(room.remove_seat(&ClientId::from("p1")));
        assert!(!room.remove_seat(&ClientId::from("p1")));
        assert_eq!(room.player_count(), 0);
    }

    #[test]
    fn test_snapshot_keys_by_client() {
        let mut room = Room::new(RoomCode::from("AB12"));
        room.seats.push(seat("p1"));
        let snap = room.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[&ClientId::from("p1")].hp, 10);
    }
}
